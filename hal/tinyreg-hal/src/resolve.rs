//! Identifier to address resolution
//!
//! Identifiers are small integers that encode a register block and a bit
//! within it (`id = block * block_size + bit`). Resolution is a pure
//! `const fn`, so chip crates evaluate it into associated constants and no
//! address arithmetic survives to run time.

/// Result of resolving a pin-style identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolved {
    /// Base address of the register block
    pub base: u16,
    /// Bit index within each register of the block
    pub bit: u8,
}

/// Layout of a family of identical per-port register blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortLayout {
    /// Address of port 0's block
    pub base: u16,
    /// Distance between consecutive ports' blocks
    pub stride: u16,
    /// Identifiers per port
    pub block: u8,
}

impl PortLayout {
    /// Port number of an identifier
    pub const fn port(&self, id: u8) -> u8 {
        id / self.block
    }

    /// Bit index of an identifier
    pub const fn bit(&self, id: u8) -> u8 {
        id % self.block
    }

    /// Block base address and bit index of an identifier
    pub const fn resolve(&self, id: u8) -> Resolved {
        Resolved {
            base: self.base + self.port(id) as u16 * self.stride,
            bit: self.bit(id),
        }
    }
}

/// Layout of a family of numbered peripheral instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceLayout {
    /// Address of instance 0
    pub base: u16,
    /// Distance between consecutive instances
    pub stride: u16,
    /// Number of instances the device has
    pub count: u8,
}

impl InstanceLayout {
    /// Base address of instance `n`
    ///
    /// Evaluated in a const context an out-of-range `n` fails the build.
    pub const fn resolve(&self, n: u8) -> u16 {
        assert!(n < self.count, "peripheral instance out of range");
        self.base + n as u16 * self.stride
    }
}
