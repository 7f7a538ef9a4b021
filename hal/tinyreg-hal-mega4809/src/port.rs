//! Digital pin facade
//!
//! Direction, level and interrupt flag live in the pin's virtual port; sense
//! mode, pull-up and inversion live in its `PINnCTRL` register:
//!
//! ```text
//! PINnCTRL  INVEN  -  -  -  PULLUPEN  ISC2 ISC1 ISC0
//! ```
//!
//! Inversion is done by the port hardware (INVEN), so `on()`/`off()` are
//! plain OUT writes and `is_on()` is a plain IN read.
//!
//! A full configuration goes through [`Pin::init`], which merges its options
//! first and then writes INTFLAGS (only if a stale flag must go), PINnCTRL,
//! OUT (only for outputs) and DIR once each.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use tinyreg_hal::register::access::{ReadToggle, ReadWrite, WriteOneToClear};
use tinyreg_hal::resolve::Resolved;
use tinyreg_hal::{Bus, Field, IoMode, IscMode, Mmio, PinConfig, PinOption, Register};
use tock_registers::fields::FieldValue;
use tock_registers::register_bitfields;

use crate::pins::{
    pinctrl_addr, resolve, PinId, DIR_OFFSET, INTFLAGS_OFFSET, IN_OFFSET, OUT_OFFSET,
};

register_bitfields![u8,
    PINCTRL [
        ISC OFFSET(0) NUMBITS(3) [],
        PULLUPEN OFFSET(3) NUMBITS(1) [],
        INVEN OFFSET(7) NUMBITS(1) []
    ]
];

type PinCtrl = PINCTRL::Register;

/// One GPIO pin
pub struct Pin<const N: u8, B: Bus = Mmio> {
    bus: B,
    id: PinId<N>,
}

impl<const N: u8, B: Bus> Pin<N, B> {
    const AT: Resolved = resolve(N);

    const DIR: Field<ReadWrite> =
        Field::bit(Register::at(Self::AT.base + DIR_OFFSET), Self::AT.bit);
    const OUT: Field<ReadWrite> =
        Field::bit(Register::at(Self::AT.base + OUT_OFFSET), Self::AT.bit);
    const IN: Field<ReadToggle> = Field::bit(Register::at(Self::AT.base + IN_OFFSET), Self::AT.bit);
    const FLAG: Field<WriteOneToClear> = Field::bit(
        Register::at(Self::AT.base + INTFLAGS_OFFSET).with_w1c(0xFF),
        Self::AT.bit,
    );

    const PINCTRL: Register = Register::at(pinctrl_addr(N));
    const ISC: Field<ReadWrite, PinCtrl> = Field::of(Self::PINCTRL, PINCTRL::ISC);
    const PULLUPEN: Field<ReadWrite, PinCtrl> = Field::of(Self::PINCTRL, PINCTRL::PULLUPEN);
    const INVEN: Field<ReadWrite, PinCtrl> = Field::of(Self::PINCTRL, PINCTRL::INVEN);

    /// Take over a pin without touching it
    pub fn new(id: PinId<N>, bus: B) -> Self {
        Self { bus, id }
    }

    /// Take over a pin and configure it
    pub fn with_init<I>(id: PinId<N>, bus: B, options: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PinOption>,
    {
        let mut pin = Self::new(id, bus);
        pin.init(options);
        pin
    }

    pub fn free(self) -> PinId<N> {
        self.id
    }

    /// Apply a set of options, in any order
    ///
    /// Unspecified kinds fall back to their reset values, so `init` always
    /// describes the whole pin configuration.
    pub fn init<I>(&mut self, options: I)
    where
        I: IntoIterator,
        I::Item: Into<PinOption>,
    {
        let config = PinConfig::merge(options);

        #[cfg(feature = "defmt")]
        defmt::trace!("pin {}: init {}", N, config);

        self.commit(&config);
    }

    fn commit(&mut self, config: &PinConfig) {
        if config.needs_flag_clear() {
            self.clear_flag();
        }
        Self::PINCTRL.write_fields(&self.bus, Self::pinctrl_fields(config));
        if config.is_output() {
            Self::OUT.set(&self.bus, config.init as u8);
        }
        Self::DIR.set(&self.bus, config.is_output() as u8);
    }

    fn pinctrl_fields(config: &PinConfig) -> FieldValue<u8, PinCtrl> {
        Self::ISC.val(config.isc.bits())
            + Self::PULLUPEN.val(config.pullup as u8)
            + Self::INVEN.val(config.invert as u8)
    }

    /// Back to the analog (lowest power) state
    pub fn deinit(&mut self) {
        self.analog();
    }

    #[inline]
    pub fn output(&mut self) {
        Self::DIR.set(&self.bus, 1);
    }

    #[inline]
    pub fn input(&mut self) {
        Self::DIR.set(&self.bus, 0);
    }

    /// Disable the digital input buffer and make the pin an input
    ///
    /// PINnCTRL is overwritten as a whole: pull-up and inversion go off too.
    pub fn analog(&mut self) {
        Self::PINCTRL.write_fields(&self.bus, Self::ISC.val(IscMode::InputDisable.bits()));
        self.input();
    }

    pub fn io_mode(&mut self, mode: IoMode) {
        match mode {
            IoMode::Input => self.input(),
            IoMode::Output => self.output(),
            IoMode::Analog => self.analog(),
        }
    }

    /// Current mode as read back from DIR and the sense bits
    pub fn mode(&self) -> IoMode {
        if Self::DIR.is_set(&self.bus) {
            IoMode::Output
        } else if Self::ISC.get(&self.bus) == IscMode::InputDisable.bits() {
            IoMode::Analog
        } else {
            IoMode::Input
        }
    }

    pub fn invert_on(&mut self) {
        Self::INVEN.set(&self.bus, 1);
    }

    pub fn invert_off(&mut self) {
        Self::INVEN.set(&self.bus, 0);
    }

    pub fn pullup_on(&mut self) {
        Self::PULLUPEN.set(&self.bus, 1);
    }

    pub fn pullup_off(&mut self) {
        Self::PULLUPEN.set(&self.bus, 0);
    }

    /// Set the input sense mode
    ///
    /// The interrupt flag is left alone; clear it first if a stale event
    /// must not fire under the new mode.
    pub fn in_mode(&mut self, mode: IscMode) {
        Self::ISC.set(&self.bus, mode.bits());
    }

    #[inline]
    pub fn clear_flag(&mut self) {
        Self::FLAG.clear(&self.bus);
    }

    #[inline]
    pub fn is_flag(&self) -> bool {
        Self::FLAG.is_set(&self.bus)
    }

    #[inline]
    pub fn on(&mut self) {
        Self::OUT.set(&self.bus, 1);
    }

    #[inline]
    pub fn off(&mut self) {
        Self::OUT.set(&self.bus, 0);
    }

    pub fn on_if(&mut self, on: bool) {
        if on {
            self.on();
        } else {
            self.off();
        }
    }

    /// Toggle OUT by writing 1 to the pin's IN bit
    #[inline]
    pub fn toggle(&mut self) {
        Self::IN.toggle(&self.bus);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        Self::IN.is_set(&self.bus)
    }

    #[inline]
    pub fn is_off(&self) -> bool {
        !self.is_on()
    }
}

// Levels below are as seen through INVEN.

impl<const N: u8, B: Bus> ErrorType for Pin<N, B> {
    type Error = core::convert::Infallible;
}

impl<const N: u8, B: Bus> OutputPin for Pin<N, B> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.off();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.on();
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
        Ok(self.is_on())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.is_off())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::{PA0, PB2};
    use proptest::prelude::*;
    use tinyreg_hal::{InitVal, Invert, Pullup, SimBus};

    // VPORTA
    const DIRA: u16 = 0x00;
    const OUTA: u16 = 0x01;
    const INA: u16 = 0x02;
    const FLAGSA: u16 = 0x03;
    const PA0CTRL: u16 = 0x410;

    // VPORTB
    const DIRB: u16 = 0x04;
    const OUTB: u16 = 0x05;
    const FLAGSB: u16 = 0x07;
    const PB2CTRL: u16 = 0x432;

    fn sim() -> SimBus {
        let sim = SimBus::new();
        for port in 0..6u16 {
            sim.toggles(port * 4 + 2, port * 4 + 1);
            sim.w1c(port * 4 + 3, 0xFF);
        }
        sim
    }

    fn pa0(bus: &SimBus) -> Pin<PA0, &SimBus> {
        Pin::new(PinId::new(), bus)
    }

    fn pb2(bus: &SimBus) -> Pin<PB2, &SimBus> {
        Pin::new(PinId::new(), bus)
    }

    #[test]
    fn test_init_switch_any_order() {
        let a = sim();
        pa0(&a).init([
            PinOption::from(Invert::LowIsOn),
            IoMode::Input.into(),
            Pullup::On.into(),
        ]);

        let b = sim();
        pa0(&b).init([
            PinOption::from(Pullup::On),
            Invert::LowIsOn.into(),
            IoMode::Input.into(),
        ]);

        assert_eq!(a.writes(), b.writes());
        assert_eq!(a.peek(PA0CTRL), 0x88);
        assert_eq!(a.peek(DIRA), 0x00);
        // Input: OUT is not written
        assert_eq!(a.writes_to(OUTA), 0);
    }

    #[test]
    fn test_init_output_one_write_per_register() {
        let sim = sim();
        sim.poke(FLAGSB, 0xFF); // stale flags everywhere
        let mut led = pb2(&sim);

        led.init([
            PinOption::from(IscMode::Rising),
            IoMode::Output.into(),
            InitVal::On.into(),
        ]);

        assert_eq!(
            sim.writes().as_slice(),
            &[(FLAGSB, 0x04), (PB2CTRL, 0x02), (OUTB, 0x04), (DIRB, 0x04)]
        );
        // Only this pin's flag was cleared
        assert_eq!(sim.peek(FLAGSB), 0xFB);
        assert_eq!(led.mode(), IoMode::Output);
    }

    #[test]
    fn test_init_analog_disables_input() {
        let sim = sim();
        let mut pin = pa0(&sim);

        pin.init([PinOption::from(IscMode::Falling), IoMode::Analog.into()]);

        assert_eq!(sim.peek(PA0CTRL), 0x04);
        assert_eq!(sim.writes_to(FLAGSA), 0);
        assert_eq!(pin.mode(), IoMode::Analog);
    }

    #[test]
    fn test_analog_overwrites_pinctrl() {
        let sim = sim();
        let mut pin = pa0(&sim);
        sim.poke(PA0CTRL, 0x8B);
        sim.poke(DIRA, 0xFF);

        pin.deinit();

        assert_eq!(sim.peek(PA0CTRL), 0x04);
        assert_eq!(sim.peek(DIRA), 0xFE);
        assert_eq!(pin.mode(), IoMode::Analog);
    }

    #[test]
    fn test_pinctrl_fields_preserve_neighbours() {
        let sim = sim();
        let mut pin = pa0(&sim);

        pin.in_mode(IscMode::BothEdges);
        pin.pullup_on();
        pin.invert_on();
        assert_eq!(sim.peek(PA0CTRL), 0x89);

        pin.pullup_off();
        assert_eq!(sim.peek(PA0CTRL), 0x81);
        pin.invert_off();
        assert_eq!(sim.peek(PA0CTRL), 0x01);
    }

    #[test]
    fn test_toggle_and_level() {
        let sim = sim();
        let mut pin = pb2(&sim);
        sim.poke(0x06, 0x00); // INB

        pin.toggle();
        assert_eq!(sim.writes().as_slice(), &[(0x06, 0x04)]);
        assert_eq!(sim.peek(OUTB), 0x04);

        sim.poke(0x06, 0x04);
        assert!(pin.is_on());
        sim.poke(0x06, 0x00);
        assert!(pin.is_off());
    }

    #[test]
    fn test_clear_flag_twice() {
        let sim = sim();
        let mut pin = pa0(&sim);
        sim.poke(FLAGSA, 0x81);

        pin.clear_flag();
        pin.clear_flag();

        assert!(!pin.is_flag());
        assert_eq!(sim.peek(FLAGSA), 0x80);
        assert_eq!(sim.writes().as_slice(), &[(FLAGSA, 0x01), (FLAGSA, 0x01)]);
    }

    #[test]
    fn test_io_mode_and_on_if() {
        let sim = sim();
        let mut pin = pb2(&sim);

        pin.io_mode(IoMode::Output);
        assert_eq!(pin.mode(), IoMode::Output);
        pin.on_if(true);
        assert_eq!(sim.peek(OUTB), 0x04);
        pin.on_if(false);
        assert_eq!(sim.peek(OUTB), 0x00);

        pin.io_mode(IoMode::Input);
        assert_eq!(pin.mode(), IoMode::Input);
    }

    #[test]
    fn test_embedded_hal_traits() {
        let sim = sim();
        let mut pin = pa0(&sim);

        OutputPin::set_high(&mut pin).unwrap();
        assert!(StatefulOutputPin::is_set_high(&mut pin).unwrap());
        StatefulOutputPin::toggle(&mut pin).unwrap();
        assert!(StatefulOutputPin::is_set_low(&mut pin).unwrap());

        sim.poke(INA, 0x01);
        assert!(InputPin::is_high(&mut pin).unwrap());
    }

    proptest! {
        #[test]
        fn prop_output_on_off_round_trip(dir in any::<u8>(), out in any::<u8>()) {
            let sim = sim();
            sim.poke(DIRB, dir);
            sim.poke(OUTB, out);
            let mut pin = pb2(&sim);

            pin.output();
            pin.on();
            pin.off();

            prop_assert_eq!(pin.mode(), IoMode::Output);
            prop_assert_eq!(sim.peek(OUTB) & 0x04, 0);
            prop_assert_eq!(sim.peek(DIRB) & !0x04, dir & !0x04);
            prop_assert_eq!(sim.peek(OUTB) & !0x04, out & !0x04);
        }

        #[test]
        fn prop_init_writes_each_register_at_most_once(
            options in proptest::collection::vec(
                prop_oneof![
                    (0u8..3).prop_map(|m| PinOption::Io(match m {
                        0 => IoMode::Input,
                        1 => IoMode::Output,
                        _ => IoMode::Analog,
                    })),
                    (0u8..6).prop_map(|b| PinOption::Isc(IscMode::from_bits(b).unwrap())),
                    any::<bool>().prop_map(|on| PinOption::Pullup(if on { Pullup::On } else { Pullup::Off })),
                    any::<bool>().prop_map(|on| PinOption::Init(if on { InitVal::On } else { InitVal::Off })),
                ],
                0..8,
            )
        ) {
            let sim = sim();
            pb2(&sim).init(options);

            for addr in [FLAGSB, PB2CTRL, OUTB, DIRB] {
                prop_assert!(sim.writes_to(addr) <= 1);
            }
        }
    }
}
