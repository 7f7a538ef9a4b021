//! Digital pin facade
//!
//! The register addresses of `Pin<N>` are associated constants computed
//! from `N` at build time. Invert is a property of the wiring and is fixed
//! when the facade is created: with [`Invert::LowIsOn`], `on()` drives the
//! line low.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use tinyreg_hal::register::access::{ReadToggle, ReadWrite};
use tinyreg_hal::resolve::Resolved;
use tinyreg_hal::{Bus, Field, Invert, Mmio, Register};

use crate::pins::{resolve, PinId, DDR_OFFSET, PIN_OFFSET, PORT_OFFSET};

/// One GPIO pin
pub struct Pin<const N: u8, B: Bus = Mmio> {
    bus: B,
    invert: Invert,
    id: PinId<N>,
}

impl<const N: u8, B: Bus> Pin<N, B> {
    const AT: Resolved = resolve(N);
    const IN: Field<ReadToggle> =
        Field::bit(Register::at(Self::AT.base + PIN_OFFSET), Self::AT.bit);
    const DIR: Field<ReadWrite> =
        Field::bit(Register::at(Self::AT.base + DDR_OFFSET), Self::AT.bit);
    const OUT: Field<ReadWrite> =
        Field::bit(Register::at(Self::AT.base + PORT_OFFSET), Self::AT.bit);

    /// Take over a pin
    ///
    /// Nothing is written; the pin stays in whatever state it is in.
    pub fn new(id: PinId<N>, invert: Invert, bus: B) -> Self {
        Self {
            bus,
            invert,
            id,
        }
    }

    /// Give the pin token back
    pub fn free(self) -> PinId<N> {
        self.id
    }

    pub fn invert(&self) -> Invert {
        self.invert
    }

    /// Drive the line high
    #[inline]
    pub fn high(&mut self) {
        Self::OUT.set(&self.bus, 1);
    }

    /// Drive the line low
    #[inline]
    pub fn low(&mut self) {
        Self::OUT.set(&self.bus, 0);
    }

    #[inline]
    pub fn on(&mut self) {
        match self.invert {
            Invert::HighIsOn => self.high(),
            Invert::LowIsOn => self.low(),
        }
    }

    #[inline]
    pub fn off(&mut self) {
        match self.invert {
            Invert::HighIsOn => self.low(),
            Invert::LowIsOn => self.high(),
        }
    }

    /// `on()` if `on`, else `off()`
    pub fn set_on(&mut self, on: bool) {
        if on {
            self.on();
        } else {
            self.off();
        }
    }

    /// Toggle the output latch by writing 1 to its PINx bit
    #[inline]
    pub fn toggle(&mut self) {
        Self::IN.toggle(&self.bus);
    }

    #[inline]
    pub fn output(&mut self) {
        Self::DIR.set(&self.bus, 1);
    }

    #[inline]
    pub fn input(&mut self) {
        Self::DIR.set(&self.bus, 0);
    }

    /// Enable the pull-up (takes effect while the pin is an input)
    #[inline]
    pub fn pullup_on(&mut self) {
        Self::OUT.set(&self.bus, 1);
    }

    #[inline]
    pub fn pullup_off(&mut self) {
        Self::OUT.set(&self.bus, 0);
    }

    pub fn is_output(&self) -> bool {
        Self::DIR.is_set(&self.bus)
    }

    /// Line level read back from PINx
    pub fn is_high(&self) -> bool {
        Self::IN.is_set(&self.bus)
    }

    /// Whether the line is at its "on" level
    pub fn is_on(&self) -> bool {
        self.is_high() ^ (self.invert == Invert::LowIsOn)
    }

    pub fn is_off(&self) -> bool {
        !self.is_on()
    }
}

impl<const N: u8, B: Bus> ErrorType for Pin<N, B> {
    type Error = core::convert::Infallible;
}

impl<const N: u8, B: Bus> OutputPin for Pin<N, B> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high();
        Ok(())
    }
}

impl<const N: u8, B: Bus> StatefulOutputPin for Pin<N, B> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(Self::OUT.is_set(&self.bus))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!Self::OUT.is_set(&self.bus))
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        Pin::toggle(self);
        Ok(())
    }
}

impl<const N: u8, B: Bus> InputPin for Pin<N, B> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(Pin::is_high(self))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!Pin::is_high(self))
    }
}
