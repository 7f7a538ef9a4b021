//! USART options and receive errors
//!
//! Same pattern as [`crate::gpio`]: options of different kinds commute, the
//! last option of a kind wins, and the merged [`UsartConfig`] is committed
//! with one write per register.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Parity {
    #[default]
    Disabled = 0,
    Even = 2,
    Odd = 3,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum StopBits {
    #[default]
    One = 0,
    Two = 1,
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum DataBits {
    Five = 0,
    Six = 1,
    Seven = 2,
    #[default]
    Eight = 3,
}

/// Receiver clock mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum RxMode {
    #[default]
    Normal = 0,
    /// Double transmission speed
    Clk2x = 1,
    /// Generic auto-baud
    GenAuto = 2,
    /// LIN constrained auto-baud
    LinAuto = 3,
}

impl RxMode {
    /// Samples per bit for the baud formula
    pub const fn samples_per_bit(self) -> u32 {
        match self {
            RxMode::Clk2x => 8,
            _ => 16,
        }
    }
}

/// Smallest BAUD register value the fractional generator accepts
pub const BAUD_MIN: u16 = 64;

/// BAUD register value for a bit rate
///
/// `BAUD = 64 * f_cpu / (S * bps)`, rounded to nearest and clamped to
/// [`BAUD_MIN`]`..=u16::MAX`. Usable in constants:
///
/// ```
/// use tinyreg_hal::uart::{baud_register, RxMode};
/// const BAUD: u16 = baud_register(3_333_333, 9600, RxMode::Normal);
/// assert_eq!(BAUD, 1389);
/// ```
pub const fn baud_register(f_cpu: u32, bps: u32, rx_mode: RxMode) -> u16 {
    let num = 64 * f_cpu as u64;
    let den = rx_mode.samples_per_bit() as u64 * bps as u64;
    let value = (num + den / 2) / den;
    if value < BAUD_MIN as u64 {
        BAUD_MIN
    } else if value > u16::MAX as u64 {
        u16::MAX
    } else {
        value as u16
    }
}

/// One USART configuration option of any kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UsartOption {
    /// Raw BAUD register value, see [`baud_register`]
    Baud(u16),
    Parity(Parity),
    StopBits(StopBits),
    DataBits(DataBits),
    RxMode(RxMode),
}

impl From<Parity> for UsartOption {
    fn from(v: Parity) -> Self {
        UsartOption::Parity(v)
    }
}

impl From<StopBits> for UsartOption {
    fn from(v: StopBits) -> Self {
        UsartOption::StopBits(v)
    }
}

impl From<DataBits> for UsartOption {
    fn from(v: DataBits) -> Self {
        UsartOption::DataBits(v)
    }
}

impl From<RxMode> for UsartOption {
    fn from(v: RxMode) -> Self {
        UsartOption::RxMode(v)
    }
}

/// Merged USART configuration
///
/// Frame format fields default to 8N1 in normal receive mode. The baud
/// register is only written when a baud option was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsartConfig {
    pub baud: Option<u16>,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub data_bits: DataBits,
    pub rx_mode: RxMode,
}

impl UsartConfig {
    /// Fold options into one configuration
    pub fn merge<I>(options: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<UsartOption>,
    {
        let mut config = Self::default();
        for option in options {
            match option.into() {
                UsartOption::Baud(v) => config.baud = Some(v),
                UsartOption::Parity(v) => config.parity = v,
                UsartOption::StopBits(v) => config.stop_bits = v,
                UsartOption::DataBits(v) => config.data_bits = v,
                UsartOption::RxMode(v) => config.rx_mode = v,
            }
        }
        config
    }
}

/// Receive error flags captured with a received byte
///
/// Bit positions are those of the receive status byte (`RXDATAH`): parity
/// error, frame error and buffer overflow. An empty mask means the byte is
/// good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxErrors(u8);

impl RxErrors {
    pub const PARITY: u8 = 1 << 1;
    pub const FRAME: u8 = 1 << 2;
    pub const OVERFLOW: u8 = 1 << 6;
    /// All error bits
    pub const MASK: u8 = Self::PARITY | Self::FRAME | Self::OVERFLOW;

    /// Keep only the error bits of a status byte
    pub const fn from_status(status: u8) -> Self {
        Self(status & Self::MASK)
    }

    /// Raw mask
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn parity(self) -> bool {
        self.0 & Self::PARITY != 0
    }

    pub const fn frame(self) -> bool {
        self.0 & Self::FRAME != 0
    }

    pub const fn overflow(self) -> bool {
        self.0 & Self::OVERFLOW != 0
    }
}
