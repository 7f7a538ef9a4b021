//! Device singleton
//!
//! Every ownership token of the chip is handed out exactly once, through
//! [`Peripherals::take`].

use portable_atomic::{AtomicBool, Ordering};

use crate::ac::AcId;
use crate::pins::Pins;

static TAKEN: AtomicBool = AtomicBool::new(false);

/// All ownership tokens of the ATmega328P
pub struct Peripherals {
    pub pins: Pins,
    pub ac: AcId,
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
            ac: AcId::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_once() {
        let first = Peripherals::take();
        assert!(first.is_some());
        assert!(Peripherals::take().is_none());
        assert_eq!(first.map(|p| p.pins.pd7.id()), Some(23));
    }
}
