//! Register bus abstraction
//!
//! Every register access in the workspace funnels through [`Bus`]. The
//! production implementation, [`Mmio`], performs exactly one volatile byte
//! load or store per call; the simulated bus used by tests records the same
//! calls so their order and count can be checked on the host.

/// Byte-addressed register bus
///
/// Addresses are AVR data-space addresses (the I/O space appears at
/// `0x20..0x60` on classic parts and at `0x0000..` on the 0/1-series).
pub trait Bus: Copy {
    /// Read one register byte
    fn read(&self, addr: u16) -> u8;

    /// Write one register byte
    fn write(&self, addr: u16, value: u8);

    /// Read a 16-bit register pair
    ///
    /// The low byte is read first; on AVR this latches the high byte into
    /// the shared TEMP register so the pair is read consistently.
    fn read16(&self, addr: u16) -> u16 {
        let lo = self.read(addr);
        let hi = self.read(addr + 1);
        u16::from_le_bytes([lo, hi])
    }

    /// Write a 16-bit register pair
    ///
    /// The low byte is written first, the high byte write commits both.
    fn write16(&self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(addr, lo);
        self.write(addr + 1, hi);
    }
}

/// Memory-mapped I/O bus
///
/// Zero-sized; copying it around costs nothing. Accesses are volatile so the
/// compiler never caches, merges, reorders or elides them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mmio;

#[allow(unsafe_code)]
impl Bus for Mmio {
    #[inline(always)]
    fn read(&self, addr: u16) -> u8 {
        // SAFETY: register addresses come from the chip crates' fixed
        // tables and always name a mapped I/O location.
        unsafe { core::ptr::read_volatile(addr as usize as *const u8) }
    }

    #[inline(always)]
    fn write(&self, addr: u16, value: u8) {
        // SAFETY: see `read`.
        unsafe { core::ptr::write_volatile(addr as usize as *mut u8, value) }
    }
}
