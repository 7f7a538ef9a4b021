//! Device singleton

use portable_atomic::{AtomicBool, Ordering};

use crate::pins::Pins;
use crate::usart::UsartId;

static TAKEN: AtomicBool = AtomicBool::new(false);

/// All ownership tokens of the ATmega4809
///
/// A USART consumes its instance token and the tokens of the two pins of
/// the route it is built for.
pub struct Peripherals {
    pub pins: Pins,
    pub usart0: UsartId<0>,
    pub usart1: UsartId<1>,
    pub usart2: UsartId<2>,
    pub usart3: UsartId<3>,
}

impl Peripherals {
    /// Take the tokens; `None` on every call after the first
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            #[cfg(feature = "defmt")]
            defmt::warn!("peripherals already taken");
            return None;
        }
        Some(Self::new())
    }

    /// Take the tokens regardless of earlier calls
    ///
    /// # Safety
    ///
    /// Facades built from two sets of tokens alias the same registers. The
    /// caller must make sure only one set is in use.
    #[allow(unsafe_code)]
    pub unsafe fn steal() -> Self {
        TAKEN.store(true, Ordering::Release);
        Self::new()
    }

    const fn new() -> Self {
        Self {
            pins: Pins::new(),
            usart0: UsartId::new(),
            usart1: UsartId::new(),
            usart2: UsartId::new(),
            usart3: UsartId::new(),
        }
    }
}
