//! Analog comparator
//!
//! The comparator's registers are spread over four blocks:
//!
//! ```text
//! 0x50 ACSR    ACD  ACBG ACO  ACI  ACIE ACIC ACIS1 ACIS0
//!                        RO   W1C
//! 0x7A ADCSRA  ADEN  -   -   ADIF  -    -    -     -
//! 0x7B ADCSRB   -   ACME -    -    -    -    -     -
//! 0x7C ADMUX    -    -   -    -   MUX3 MUX2 MUX1  MUX0
//! 0x7F DIDR1    -    -   -    -    -    -   AIN1D AIN0D
//! ```
//!
//! The negative input is either the AIN1 pin or, through the ADC
//! multiplexer, one of ADC0..ADC7. The mux path is only available while the
//! ADC itself is disabled.

use tinyreg_hal::register::access::{ReadOnly, ReadWrite, WriteOneToClear};
use tinyreg_hal::{Bus, Field, Mmio, Register};
use tock_registers::register_bitfields;

register_bitfields![u8,
    ACSR [
        ACIS OFFSET(0) NUMBITS(2) [],
        ACIC OFFSET(2) NUMBITS(1) [],
        ACIE OFFSET(3) NUMBITS(1) [],
        ACI OFFSET(4) NUMBITS(1) [],
        ACO OFFSET(5) NUMBITS(1) [],
        ACBG OFFSET(6) NUMBITS(1) [],
        ACD OFFSET(7) NUMBITS(1) []
    ],
    ADCSRA [
        ADEN OFFSET(7) NUMBITS(1) []
    ],
    ADCSRB [
        ACME OFFSET(6) NUMBITS(1) []
    ],
    ADMUX [
        MUX OFFSET(0) NUMBITS(4) []
    ],
    DIDR1 [
        AIN0D OFFSET(0) NUMBITS(1) [],
        AIN1D OFFSET(1) NUMBITS(1) []
    ]
];

type Acsr = ACSR::Register;

const ACSR_AT: Register = Register::at(0x50).with_w1c(1 << 4);
const ADCSRA_AT: Register = Register::at(0x7A).with_w1c(1 << 4);
const ADCSRB_AT: Register = Register::at(0x7B);
const ADMUX_AT: Register = Register::at(0x7C);
const DIDR1_AT: Register = Register::at(0x7F);

const ACIS: Field<ReadWrite, Acsr> = Field::of(ACSR_AT, ACSR::ACIS);
const ACIC: Field<ReadWrite, Acsr> = Field::of(ACSR_AT, ACSR::ACIC);
const ACIE: Field<ReadWrite, Acsr> = Field::of(ACSR_AT, ACSR::ACIE);
const ACI: Field<WriteOneToClear, Acsr> = Field::of(ACSR_AT, ACSR::ACI);
const ACO: Field<ReadOnly, Acsr> = Field::of(ACSR_AT, ACSR::ACO);
const ACBG: Field<ReadWrite, Acsr> = Field::of(ACSR_AT, ACSR::ACBG);
const ACD: Field<ReadWrite, Acsr> = Field::of(ACSR_AT, ACSR::ACD);
const ADEN: Field<ReadWrite, ADCSRA::Register> = Field::of(ADCSRA_AT, ADCSRA::ADEN);
const ACME: Field<ReadWrite, ADCSRB::Register> = Field::of(ADCSRB_AT, ADCSRB::ACME);
const MUX: Field<ReadWrite, ADMUX::Register> = Field::of(ADMUX_AT, ADMUX::MUX);
const AIN0D: Field<ReadWrite, DIDR1::Register> = Field::of(DIDR1_AT, DIDR1::AIN0D);
const AIN1D: Field<ReadWrite, DIDR1::Register> = Field::of(DIDR1_AT, DIDR1::AIN1D);

/// Negative comparator input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NegInput {
    Adc0 = 0,
    Adc1 = 1,
    Adc2 = 2,
    Adc3 = 3,
    Adc4 = 4,
    Adc5 = 5,
    Adc6 = 6,
    Adc7 = 7,
    Ain1 = 8,
}

/// Positive comparator input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PosInput {
    Ain0 = 0,
    /// Internal 1.1V bandgap reference
    Bandgap = 1,
}

/// Output edge that raises the comparator interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IrqMode {
    Toggle = 0,
    Falling = 2,
    Rising = 3,
}

/// Comparator state as read from hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcState {
    /// Powered down (ACD set)
    Off,
    /// Running, no pending event
    Armed,
    /// Running, interrupt flag latched
    Triggered,
}

/// Ownership token for the comparator
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcId {
    _private: (),
}

impl AcId {
    pub(crate) const fn new() -> Self {
        Self { _private: () }
    }

    /// # Safety
    ///
    /// The caller must make sure no other facade uses the comparator.
    #[allow(unsafe_code)]
    pub unsafe fn steal() -> Self {
        Self::new()
    }
}

/// Analog comparator facade
pub struct AnalogComparator<B: Bus = Mmio> {
    bus: B,
    id: AcId,
}

impl<B: Bus> AnalogComparator<B> {
    /// Take over the comparator without touching it
    pub fn new(id: AcId, bus: B) -> Self {
        Self { bus, id }
    }

    pub fn free(self) -> AcId {
        self.id
    }

    /// Disconnect AIN0's digital input buffer
    pub fn ain0_analog(&mut self) {
        AIN0D.set(&self.bus, 1);
    }

    pub fn ain0_digital(&mut self) {
        AIN0D.set(&self.bus, 0);
    }

    /// Disconnect AIN1's digital input buffer
    pub fn ain1_analog(&mut self) {
        AIN1D.set(&self.bus, 1);
    }

    pub fn ain1_digital(&mut self) {
        AIN1D.set(&self.bus, 0);
    }

    /// Select the negative input
    ///
    /// AIN1 turns the ADC multiplexer path off and puts AIN1 in analog
    /// mode. An ADC channel disables the ADC, routes the multiplexer to the
    /// comparator and selects the channel.
    pub fn neg_sel(&mut self, input: NegInput) {
        match input {
            NegInput::Ain1 => {
                ACME.set(&self.bus, 0);
                self.ain1_analog();
            }
            channel => {
                ADEN.set(&self.bus, 0);
                ACME.set(&self.bus, 1);
                MUX.set(&self.bus, channel as u8);
            }
        }
    }

    /// Select the positive input; AIN0 is put in analog mode
    pub fn pos_sel(&mut self, input: PosInput) {
        ACBG.set(&self.bus, input as u8);
        if input == PosInput::Ain0 {
            self.ain0_analog();
        }
    }

    /// Route the comparator output to timer 1's input capture
    pub fn capture_on(&mut self) {
        ACIC.set(&self.bus, 1);
    }

    pub fn capture_off(&mut self) {
        ACIC.set(&self.bus, 0);
    }

    pub fn irq_mode(&mut self, mode: IrqMode) {
        ACIS.set(&self.bus, mode as u8);
    }

    pub fn irq_on(&mut self) {
        ACIE.set(&self.bus, 1);
    }

    /// Set the interrupt mode, then enable the interrupt
    pub fn irq_on_with(&mut self, mode: IrqMode) {
        self.irq_mode(mode);
        self.irq_on();
    }

    pub fn irq_off(&mut self) {
        ACIE.set(&self.bus, 0);
    }

    pub fn is_flag(&self) -> bool {
        ACI.is_set(&self.bus)
    }

    /// Clear the interrupt flag
    ///
    /// Hardware clears it on its own when the interrupt vector runs.
    pub fn clear_flag(&mut self) {
        ACI.clear(&self.bus);
    }

    /// Comparator output, true when the positive input is higher
    pub fn output_level(&self) -> bool {
        ACO.is_set(&self.bus)
    }

    /// Power the comparator up (its reset state)
    pub fn on(&mut self) {
        ACD.set(&self.bus, 0);
    }

    /// Disable the interrupt, then power the comparator down
    pub fn off(&mut self) {
        self.irq_off();
        ACD.set(&self.bus, 1);
    }

    /// Select inputs, then power up
    pub fn on_inputs(&mut self, neg: NegInput, pos: PosInput) {
        self.neg_sel(neg);
        self.pos_sel(pos);
        self.on();
    }

    /// Select inputs, power up and arm the interrupt
    ///
    /// The stale flag is cleared after the mode change and before the
    /// interrupt is enabled, so the new configuration cannot fire on an old
    /// event.
    pub fn on_irq(&mut self, neg: NegInput, pos: PosInput, mode: IrqMode) {
        #[cfg(feature = "defmt")]
        defmt::debug!("ac: on neg={} pos={} mode={}", neg, pos, mode);

        self.on_inputs(neg, pos);
        self.irq_mode(mode);
        self.clear_flag();
        self.irq_on();
    }

    pub fn state(&self) -> AcState {
        if ACD.is_set(&self.bus) {
            AcState::Off
        } else if self.is_flag() {
            AcState::Triggered
        } else {
            AcState::Armed
        }
    }
}
