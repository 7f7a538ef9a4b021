//! ATmega328P pin identifiers
//!
//! A pin identifier is `port * 8 + bit` with ports B, C and D numbered
//! 0, 1 and 2. Port C has no bit 7, so identifier 15 does not exist.
//!
//! Each port occupies three consecutive data-space registers starting at
//! `PINB` (0x23):
//!
//! | Offset | Register | Use                                  |
//! |--------|----------|--------------------------------------|
//! | 0      | PINx     | input level; writing 1 toggles PORTx |
//! | 1      | DDRx     | direction, 1 = output                |
//! | 2      | PORTx    | output level / pull-up enable        |

use tinyreg_hal::resolve::{PortLayout, Resolved};

/// Port register blocks
pub const PORTS: PortLayout = PortLayout {
    base: 0x23,
    stride: 3,
    block: 8,
};

/// PINx offset within a port block
pub const PIN_OFFSET: u16 = 0;
/// DDRx offset within a port block
pub const DDR_OFFSET: u16 = 1;
/// PORTx offset within a port block
pub const PORT_OFFSET: u16 = 2;

/// Resolve a pin identifier to its port block and bit
pub const fn resolve(id: u8) -> Resolved {
    PORTS.resolve(id)
}

/// Ownership token for one pin
///
/// Only [`Peripherals`](crate::Peripherals) hands these out, one per pin,
/// so at most one facade drives a given pin at a time.
///
/// Identifiers with no pin behind them do not build:
///
/// ```no_run
/// use tinyreg_hal_mega328p::pins::PinId;
///
/// let pc5 = unsafe { PinId::<13>::steal() };
/// ```
///
/// ```compile_fail
/// use tinyreg_hal_mega328p::pins::PinId;
///
/// // Port C has no bit 7
/// let pc7 = unsafe { PinId::<15>::steal() };
/// ```
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId<const N: u8> {
    _private: (),
}

impl<const N: u8> PinId<N> {
    const VALID: () = assert!(is_valid_pin(N), "pin does not exist on the ATmega328P");

    pub(crate) const fn new() -> Self {
        let () = Self::VALID;
        Self { _private: () }
    }

    /// Conjure a token without going through `Peripherals`
    ///
    /// # Safety
    ///
    /// The caller must make sure no other facade uses this pin.
    #[allow(unsafe_code)]
    pub unsafe fn steal() -> Self {
        Self::new()
    }

    /// Identifier number
    pub const fn id(&self) -> u8 {
        N
    }
}

macro_rules! pins {
    ($($field:ident: $name:ident = $id:expr),* $(,)?) => {
        $(
            #[doc = concat!("Identifier of pin ", stringify!($name))]
            pub const $name: u8 = $id;
        )*

        /// Whether an identifier names a pin of this device
        pub const fn is_valid_pin(id: u8) -> bool {
            false $(|| id == $id)*
        }

        /// One token per pin
        pub struct Pins {
            $(pub $field: PinId<$name>,)*
        }

        impl Pins {
            pub(crate) const fn new() -> Self {
                Self {
                    $($field: PinId::new(),)*
                }
            }
        }
    };
}

pins! {
    pb0: PB0 = 0, pb1: PB1 = 1, pb2: PB2 = 2, pb3: PB3 = 3,
    pb4: PB4 = 4, pb5: PB5 = 5, pb6: PB6 = 6, pb7: PB7 = 7,
    pc0: PC0 = 8, pc1: PC1 = 9, pc2: PC2 = 10, pc3: PC3 = 11,
    pc4: PC4 = 12, pc5: PC5 = 13, pc6: PC6 = 14,
    pd0: PD0 = 16, pd1: PD1 = 17, pd2: PD2 = 18, pd3: PD3 = 19,
    pd4: PD4 = 20, pd5: PD5 = 21, pd6: PD6 = 22, pd7: PD7 = 23,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pb7_resolves_to_port_b() {
        let r = resolve(PB7);
        assert_eq!(r.base, 0x23);
        assert_eq!(r.bit, 7);
        assert_eq!(r.base + PORT_OFFSET, 0x25); // PORTB
    }

    #[test]
    fn test_port_blocks() {
        assert_eq!(resolve(PC0).base, 0x26);
        assert_eq!(resolve(PD5).base, 0x29);
        assert_eq!(resolve(PD5).bit, 5);
    }

    #[test]
    fn test_valid_pins() {
        assert!(is_valid_pin(PB0));
        assert!(is_valid_pin(PC6));
        assert!(!is_valid_pin(15)); // no PC7
        assert!(is_valid_pin(PD7));
        assert!(!is_valid_pin(24));
    }

    #[test]
    fn test_resolution_is_injective() {
        let ids: Vec<u8> = (0..=u8::MAX).filter(|&id| is_valid_pin(id)).collect();
        assert_eq!(ids.len(), 23);
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                assert_ne!(resolve(a), resolve(b), "pins {} and {} collide", a, b);
            }
        }
    }
}
