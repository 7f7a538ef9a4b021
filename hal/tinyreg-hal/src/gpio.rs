//! GPIO pin options
//!
//! Pin configuration is a closed set of independent option kinds. An
//! `init` call accepts them in any order and any number, folds them into a
//! single [`PinConfig`] and only then touches hardware, so a full pin setup
//! costs one write per affected register.
//!
//! # Merge rules
//!
//! - Different kinds are independent: their order does not matter.
//! - The same kind given twice: the last one wins.
//! - [`IoMode::Analog`] forces the sense mode to [`IscMode::InputDisable`],
//!   whatever sense mode was given before or after it. If a later
//!   [`IoMode::Input`] or [`IoMode::Output`] follows it, the forced
//!   `InputDisable` reverts to [`IscMode::IntDisable`]. This is the only
//!   cross-kind rule.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pin direction and digital/analog use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum IoMode {
    #[default]
    Input = 0,
    Output = 1,
    /// Input with the digital input buffer disconnected
    Analog = 2,
}

/// Which line level counts as "on"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Invert {
    #[default]
    HighIsOn = 0,
    LowIsOn = 1,
}

/// Internal pull-up resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Pullup {
    #[default]
    Off = 0,
    On = 1,
}

/// Input sense configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum IscMode {
    /// Interrupt disabled, digital input buffer enabled
    #[default]
    IntDisable = 0,
    BothEdges = 1,
    Rising = 2,
    Falling = 3,
    /// Digital input buffer disabled
    InputDisable = 4,
    /// Interrupt on low level
    Level = 5,
}

impl IscMode {
    /// Register encoding
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decode a register value
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(IscMode::IntDisable),
            1 => Some(IscMode::BothEdges),
            2 => Some(IscMode::Rising),
            3 => Some(IscMode::Falling),
            4 => Some(IscMode::InputDisable),
            5 => Some(IscMode::Level),
            _ => None,
        }
    }

    /// Whether this mode can raise a pin interrupt
    pub const fn senses_interrupt(self) -> bool {
        self.bits() & 0b011 != 0
    }
}

/// Output level to drive before the pin becomes an output
///
/// Lets a pin such as a USART TX line sit at its idle level from the first
/// instant it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum InitVal {
    #[default]
    Off = 0,
    On = 1,
}

/// One pin configuration option of any kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PinOption {
    Io(IoMode),
    Invert(Invert),
    Pullup(Pullup),
    Isc(IscMode),
    Init(InitVal),
}

impl From<IoMode> for PinOption {
    fn from(v: IoMode) -> Self {
        PinOption::Io(v)
    }
}

impl From<Invert> for PinOption {
    fn from(v: Invert) -> Self {
        PinOption::Invert(v)
    }
}

impl From<Pullup> for PinOption {
    fn from(v: Pullup) -> Self {
        PinOption::Pullup(v)
    }
}

impl From<IscMode> for PinOption {
    fn from(v: IscMode) -> Self {
        PinOption::Isc(v)
    }
}

impl From<InitVal> for PinOption {
    fn from(v: InitVal) -> Self {
        PinOption::Init(v)
    }
}

/// Merged pin configuration
///
/// Built fresh by every `init` call and consumed by its commit. Unset
/// kinds keep the reset defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    pub io: IoMode,
    pub invert: Invert,
    pub pullup: Pullup,
    pub isc: IscMode,
    pub init: InitVal,
}

impl PinConfig {
    /// Fold options into one configuration
    pub fn merge<I>(options: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PinOption>,
    {
        let mut config = Self::default();
        for option in options {
            config.apply(option.into());
        }
        if config.io == IoMode::Analog {
            config.isc = IscMode::InputDisable;
        }
        config
    }

    fn apply(&mut self, option: PinOption) {
        match option {
            PinOption::Io(mode) => {
                self.io = mode;
                if mode == IoMode::Analog {
                    self.isc = IscMode::InputDisable;
                } else if self.isc == IscMode::InputDisable {
                    self.isc = IscMode::IntDisable;
                }
            }
            PinOption::Invert(v) => self.invert = v,
            PinOption::Pullup(v) => self.pullup = v,
            PinOption::Isc(v) => self.isc = v,
            PinOption::Init(v) => self.init = v,
        }
    }

    /// Whether the pin ends up driving
    pub const fn is_output(&self) -> bool {
        matches!(self.io, IoMode::Output)
    }

    /// Whether a stale interrupt flag must be cleared before committing
    pub const fn needs_flag_clear(&self) -> bool {
        self.isc.senses_interrupt()
    }
}
