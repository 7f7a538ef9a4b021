//! ATmega4809 (48-pin) pin identifiers
//!
//! A pin identifier is `port * 8 + bit` with ports A..F numbered 0..5.
//! Ports B, E and F are not fully bonded out on this package.
//!
//! Every pin is reached through two register blocks:
//!
//! - the virtual port `VPORTx` at `port * 4`: DIR, OUT, IN, INTFLAGS, all
//!   single-cycle accessible
//! - the full port `PORTx` at `0x400 + port * 0x20`, of which only the
//!   per-pin control registers `PINnCTRL` (offset `0x10 + n`) are used

use tinyreg_hal::resolve::{PortLayout, Resolved};

/// Virtual port register blocks
pub const VPORTS: PortLayout = PortLayout {
    base: 0x0000,
    stride: 4,
    block: 8,
};

/// Full port register blocks
pub const PORTS: PortLayout = PortLayout {
    base: 0x0400,
    stride: 0x20,
    block: 8,
};

pub const DIR_OFFSET: u16 = 0;
pub const OUT_OFFSET: u16 = 1;
pub const IN_OFFSET: u16 = 2;
pub const INTFLAGS_OFFSET: u16 = 3;
/// Offset of `PIN0CTRL` within a full port block
pub const PINCTRL_OFFSET: u16 = 0x10;

/// Virtual port block and bit of a pin
pub const fn resolve(id: u8) -> Resolved {
    VPORTS.resolve(id)
}

/// Address of a pin's `PINnCTRL` register
pub const fn pinctrl_addr(id: u8) -> u16 {
    let port = PORTS.resolve(id);
    port.base + PINCTRL_OFFSET + port.bit as u16
}

/// Ownership token for one pin
///
/// Port B stops at PB5 on the 48-pin package:
///
/// ```no_run
/// use tinyreg_hal_mega4809::pins::{PinId, PB5};
///
/// let pb5 = unsafe { PinId::<PB5>::steal() };
/// ```
///
/// ```compile_fail
/// use tinyreg_hal_mega4809::pins::PinId;
///
/// let pb6 = unsafe { PinId::<14>::steal() };
/// ```
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId<const N: u8> {
    _private: (),
}

impl<const N: u8> PinId<N> {
    const VALID: () = assert!(is_valid_pin(N), "pin does not exist on the 48-pin ATmega4809");

    pub(crate) const fn new() -> Self {
        let () = Self::VALID;
        Self { _private: () }
    }

    /// # Safety
    ///
    /// The caller must make sure no other facade uses this pin.
    #[allow(unsafe_code)]
    pub unsafe fn steal() -> Self {
        Self::new()
    }

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

        /// Whether an identifier names a pin of this package
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
    pa0: PA0 = 0, pa1: PA1 = 1, pa2: PA2 = 2, pa3: PA3 = 3,
    pa4: PA4 = 4, pa5: PA5 = 5, pa6: PA6 = 6, pa7: PA7 = 7,
    pb0: PB0 = 8, pb1: PB1 = 9, pb2: PB2 = 10, pb3: PB3 = 11,
    pb4: PB4 = 12, pb5: PB5 = 13,
    pc0: PC0 = 16, pc1: PC1 = 17, pc2: PC2 = 18, pc3: PC3 = 19,
    pc4: PC4 = 20, pc5: PC5 = 21, pc6: PC6 = 22, pc7: PC7 = 23,
    pd0: PD0 = 24, pd1: PD1 = 25, pd2: PD2 = 26, pd3: PD3 = 27,
    pd4: PD4 = 28, pd5: PD5 = 29, pd6: PD6 = 30, pd7: PD7 = 31,
    pe0: PE0 = 32, pe1: PE1 = 33, pe2: PE2 = 34, pe3: PE3 = 35,
    pf0: PF0 = 40, pf1: PF1 = 41, pf2: PF2 = 42, pf3: PF3 = 43,
    pf4: PF4 = 44, pf5: PF5 = 45, pf6: PF6 = 46,
}
