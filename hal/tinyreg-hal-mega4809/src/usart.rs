//! USART facade
//!
//! Each of the four USARTs can be routed to one of two pin pairs through
//! `PORTMUX.USARTROUTEA` (two bits per instance). The instance number and
//! both pins are const parameters of [`Usart`], so an instance that does
//! not exist or a TX/RX pair that is not one of its routes fails the build.
//!
//! | Instance | Default TX/RX | Alternate TX/RX |
//! |----------|---------------|-----------------|
//! | USART0   | PA0 / PA1     | PA4 / PA5       |
//! | USART1   | PC0 / PC1     | PC4 / PC5       |
//! | USART2   | PF0 / PF1     | PF4 / PF5       |
//! | USART3   | PB0 / PB1     | PB4 / PB5       |
//!
//! Register block (base `0x800 + n * 0x20`):
//!
//! ```text
//! 0x00 RXDATAL
//! 0x01 RXDATAH  RXCIF BUFOVF  -     -     -     FERR  PERR  DATA8
//! 0x02 TXDATAL
//! 0x04 STATUS   RXCIF TXCIF  DREIF RXSIF ISFIF  -     BDF   WFB
//! 0x05 CTRLA
//! 0x06 CTRLB    RXEN  TXEN    -    SFDEN ODME  RXMODE[1:0] MPCM
//! 0x07 CTRLC    CMODE[1:0]  PMODE[1:0]  SBMODE CHSIZE[2:0]
//! 0x08 BAUD     16 bit, low byte first
//! ```
//!
//! `read` and `write` busy-wait on their status flag with no timeout: with
//! nothing to receive, or a transmitter that never drains, the caller
//! hangs.

use tinyreg_hal::register::access::{ReadOnly, ReadWrite, WriteOneToClear};
use tinyreg_hal::{
    Bus, DataBits, Field, InitVal, InstanceLayout, IoMode, Mmio, Parity, PinOption, Pullup,
    Register, Register16, RxErrors, RxMode, StopBits, UsartConfig, UsartOption,
};
use tock_registers::register_bitfields;

use crate::pins::{
    PinId, PA0, PA1, PA4, PA5, PB0, PB1, PB4, PB5, PC0, PC1, PC4, PC5, PF0, PF1, PF4, PF5,
};
use crate::port::Pin;

register_bitfields![u8,
    STATUS [
        DREIF OFFSET(5) NUMBITS(1) [],
        TXCIF OFFSET(6) NUMBITS(1) [],
        RXCIF OFFSET(7) NUMBITS(1) []
    ],
    CTRLB [
        RXMODE OFFSET(1) NUMBITS(2) [],
        TXEN OFFSET(6) NUMBITS(1) [],
        RXEN OFFSET(7) NUMBITS(1) []
    ],
    CTRLC [
        CHSIZE OFFSET(0) NUMBITS(3) [],
        SBMODE OFFSET(3) NUMBITS(1) [],
        PMODE OFFSET(4) NUMBITS(2) []
    ]
];

/// USART register blocks
pub const USARTS: InstanceLayout = InstanceLayout {
    base: 0x0800,
    stride: 0x20,
    count: 4,
};

/// `PORTMUX.USARTROUTEA`
pub const USARTROUTEA: u16 = 0x05E2;

/// Pin route of a USART instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Route {
    Default = 0,
    Alternate = 1,
}

/// Route of instance `n` that uses `tx`/`rx`, if any
pub const fn route(n: u8, tx: u8, rx: u8) -> Option<Route> {
    let (default, alternate) = match n {
        0 => ((PA0, PA1), (PA4, PA5)),
        1 => ((PC0, PC1), (PC4, PC5)),
        2 => ((PF0, PF1), (PF4, PF5)),
        3 => ((PB0, PB1), (PB4, PB5)),
        _ => return None,
    };
    if tx == default.0 && rx == default.1 {
        Some(Route::Default)
    } else if tx == alternate.0 && rx == alternate.1 {
        Some(Route::Alternate)
    } else {
        None
    }
}

/// Ownership token for one USART instance
///
/// ```no_run
/// use tinyreg_hal_mega4809::usart::UsartId;
///
/// let usart3 = unsafe { UsartId::<3>::steal() };
/// ```
///
/// ```compile_fail
/// use tinyreg_hal_mega4809::usart::UsartId;
///
/// let usart4 = unsafe { UsartId::<4>::steal() };
/// ```
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsartId<const N: u8> {
    _private: (),
}

impl<const N: u8> UsartId<N> {
    const VALID: () = assert!(N < USARTS.count, "valid USART numbers are 0-3");

    pub(crate) const fn new() -> Self {
        let () = Self::VALID;
        Self { _private: () }
    }

    /// # Safety
    ///
    /// The caller must make sure no other facade uses this instance.
    #[allow(unsafe_code)]
    pub unsafe fn steal() -> Self {
        Self::new()
    }
}

/// Coarse USART state as read from hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartState {
    /// Transmitter and receiver off, baud generator unset
    Disabled,
    /// Baud generator set, transmitter and receiver off
    Configured,
    /// Transmitter or receiver on
    Enabled,
}

/// Receive error reported through `embedded_io`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartError {
    /// Receive buffer overflowed, at least one byte was lost
    Overflow,
    /// Stop bit missing
    Frame,
    /// Parity mismatch
    Parity,
}

impl UsartError {
    /// Most severe error in a mask, `None` for a clean byte
    pub const fn from_errors(errors: RxErrors) -> Option<Self> {
        if errors.overflow() {
            Some(UsartError::Overflow)
        } else if errors.frame() {
            Some(UsartError::Frame)
        } else if errors.parity() {
            Some(UsartError::Parity)
        } else {
            None
        }
    }
}

impl core::fmt::Display for UsartError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UsartError::Overflow => write!(f, "receive buffer overflow"),
            UsartError::Frame => write!(f, "frame error"),
            UsartError::Parity => write!(f, "parity error"),
        }
    }
}

impl embedded_io::Error for UsartError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            UsartError::Overflow => embedded_io::ErrorKind::Other,
            UsartError::Frame | UsartError::Parity => embedded_io::ErrorKind::InvalidData,
        }
    }
}

/// One USART instance bound to its TX/RX pins
///
/// ```compile_fail
/// use tinyreg_hal::Mmio;
/// use tinyreg_hal_mega4809::pins::{PinId, PA0, PA5};
/// use tinyreg_hal_mega4809::usart::{Usart, UsartId};
///
/// // PA0/PA5 is not a USART0 route
/// let usart = unsafe {
///     Usart::<0, PA0, PA5>::new(UsartId::steal(), PinId::steal(), PinId::steal(), Mmio)
/// };
/// ```
pub struct Usart<const N: u8, const TX: u8, const RX: u8, B: Bus = Mmio> {
    bus: B,
    id: UsartId<N>,
    tx: Pin<TX, B>,
    rx: Pin<RX, B>,
}

pub type Usart0<B = Mmio> = Usart<0, PA0, PA1, B>;
pub type Usart0Alt<B = Mmio> = Usart<0, PA4, PA5, B>;
pub type Usart1<B = Mmio> = Usart<1, PC0, PC1, B>;
pub type Usart1Alt<B = Mmio> = Usart<1, PC4, PC5, B>;
pub type Usart2<B = Mmio> = Usart<2, PF0, PF1, B>;
pub type Usart2Alt<B = Mmio> = Usart<2, PF4, PF5, B>;
pub type Usart3<B = Mmio> = Usart<3, PB0, PB1, B>;
pub type Usart3Alt<B = Mmio> = Usart<3, PB4, PB5, B>;

impl<const N: u8, const TX: u8, const RX: u8, B: Bus> Usart<N, TX, RX, B> {
    const ROUTE: Route = match route(N, TX, RX) {
        Some(r) => r,
        None => panic!("TX/RX pins are not a route of this USART"),
    };
    const BASE: u16 = USARTS.resolve(N);

    const RXDATAL: Register = Register::at(Self::BASE);
    const RXDATAH: Register = Register::at(Self::BASE + 0x01);
    const TXDATAL: Register = Register::at(Self::BASE + 0x02);
    const STATUS: Register = Register::at(Self::BASE + 0x04).with_w1c(0x5A);
    const CTRLB: Register = Register::at(Self::BASE + 0x06);
    const CTRLC: Register = Register::at(Self::BASE + 0x07);
    const BAUD: Register16 = Register16::at(Self::BASE + 0x08);

    const DREIF: Field<ReadOnly, STATUS::Register> = Field::of(Self::STATUS, STATUS::DREIF);
    const TXCIF: Field<WriteOneToClear, STATUS::Register> =
        Field::of(Self::STATUS, STATUS::TXCIF);
    const RXCIF: Field<ReadOnly, STATUS::Register> = Field::of(Self::STATUS, STATUS::RXCIF);

    const RXMODE: Field<ReadWrite, CTRLB::Register> = Field::of(Self::CTRLB, CTRLB::RXMODE);
    const TXEN: Field<ReadWrite, CTRLB::Register> = Field::of(Self::CTRLB, CTRLB::TXEN);
    const RXEN: Field<ReadWrite, CTRLB::Register> = Field::of(Self::CTRLB, CTRLB::RXEN);

    const CHSIZE: Field<ReadWrite, CTRLC::Register> = Field::of(Self::CTRLC, CTRLC::CHSIZE);
    const SBMODE: Field<ReadWrite, CTRLC::Register> = Field::of(Self::CTRLC, CTRLC::SBMODE);
    const PMODE: Field<ReadWrite, CTRLC::Register> = Field::of(Self::CTRLC, CTRLC::PMODE);

    const PMUX: Field<ReadWrite> = Field::new(Register::at(USARTROUTEA), N * 2, 2);

    /// Bind an instance to its pins without touching hardware
    pub fn new(id: UsartId<N>, tx: PinId<TX>, rx: PinId<RX>, bus: B) -> Self {
        let _ = Self::ROUTE;
        Self {
            bus,
            id,
            tx: Pin::new(tx, bus),
            rx: Pin::new(rx, bus),
        }
    }

    /// Give back the instance and pin tokens
    pub fn free(self) -> (UsartId<N>, PinId<TX>, PinId<RX>) {
        (self.id, self.tx.free(), self.rx.free())
    }

    /// Apply frame format options, in any order
    ///
    /// BAUD is written only when a baud option is present. CTRLC is written
    /// as a whole (asynchronous mode), RXMODE with one read-modify-write of
    /// CTRLB.
    pub fn init<I>(&mut self, options: I)
    where
        I: IntoIterator,
        I::Item: Into<UsartOption>,
    {
        let config = UsartConfig::merge(options);

        #[cfg(feature = "defmt")]
        defmt::debug!("usart{}: init {}", N, config);

        if let Some(baud) = config.baud {
            Self::BAUD.write(&self.bus, baud);
        }
        Self::CTRLC.write_fields(
            &self.bus,
            Self::CHSIZE.val(config.data_bits as u8)
                + Self::SBMODE.val(config.stop_bits as u8)
                + Self::PMODE.val(config.parity as u8),
        );
        Self::RXMODE.set(&self.bus, config.rx_mode as u8);
    }

    /// Route, set up the pins and enable transmitter and receiver
    ///
    /// TX is driven idle-high from the moment it becomes an output. The
    /// receive mode already in CTRLB is kept.
    pub fn on(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("usart{}: on, {} route", N, Self::ROUTE);

        Self::PMUX.set(&self.bus, Self::ROUTE as u8);
        self.tx.init([PinOption::from(IoMode::Output), InitVal::On.into()]);
        self.rx.init([PinOption::from(IoMode::Input), Pullup::On.into()]);
        Self::CTRLB.modify(&self.bus, CTRLB::TXEN::SET + CTRLB::RXEN::SET);
    }

    /// Disable transmitter and receiver; pins and routing stay as they are
    pub fn off(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("usart{}: off", N);

        Self::CTRLB.modify(&self.bus, CTRLB::TXEN::CLEAR + CTRLB::RXEN::CLEAR);
    }

    pub fn state(&self) -> UsartState {
        if Self::TXEN.is_set(&self.bus) || Self::RXEN.is_set(&self.bus) {
            UsartState::Enabled
        } else if Self::BAUD.read(&self.bus) != 0 {
            UsartState::Configured
        } else {
            UsartState::Disabled
        }
    }

    #[inline]
    pub fn is_tx_empty(&self) -> bool {
        Self::DREIF.is_set(&self.bus)
    }

    #[inline]
    pub fn is_tx_full(&self) -> bool {
        !self.is_tx_empty()
    }

    #[inline]
    pub fn is_tx_complete(&self) -> bool {
        Self::TXCIF.is_set(&self.bus)
    }

    pub fn clear_tx_complete(&mut self) {
        Self::TXCIF.clear(&self.bus);
    }

    #[inline]
    pub fn is_rx_data(&self) -> bool {
        Self::RXCIF.is_set(&self.bus)
    }

    /// Error bits of the byte at the head of the receive buffer, without
    /// popping it
    fn pending_errors(&self) -> RxErrors {
        RxErrors::from_status(Self::RXDATAH.read(&self.bus))
    }

    /// Transmit one byte, waiting for room in the data register
    pub fn write(&mut self, byte: u8) {
        while self.is_tx_full() {
            core::hint::spin_loop();
        }
        Self::TXDATAL.write(&self.bus, byte);
    }

    /// Receive one byte, waiting until one arrives
    ///
    /// The error bits belong to the pending byte and are sampled before the
    /// data register is read, which pops it.
    pub fn read(&mut self, byte: &mut u8) -> RxErrors {
        while !self.is_rx_data() {
            core::hint::spin_loop();
        }
        let errors = self.pending_errors();
        *byte = Self::RXDATAL.read(&self.bus);
        errors
    }

    pub fn rx_mode(&mut self, mode: RxMode) {
        Self::RXMODE.set(&self.bus, mode as u8);
    }

    pub fn stop_bits(&mut self, bits: StopBits) {
        Self::SBMODE.set(&self.bus, bits as u8);
    }

    pub fn parity(&mut self, parity: Parity) {
        Self::PMODE.set(&self.bus, parity as u8);
    }

    pub fn data_bits(&mut self, bits: DataBits) {
        Self::CHSIZE.set(&self.bus, bits as u8);
    }

    /// Set the raw BAUD register, see [`tinyreg_hal::baud_register`]
    pub fn baud_reg(&mut self, value: u16) {
        Self::BAUD.write(&self.bus, value);
    }
}

impl<const N: u8, const TX: u8, const RX: u8, B: Bus> embedded_io::ErrorType
    for Usart<N, TX, RX, B>
{
    type Error = UsartError;
}

impl<const N: u8, const TX: u8, const RX: u8, B: Bus> embedded_io::Read for Usart<N, TX, RX, B> {
    /// Blocks for the first byte, then takes whatever else is already
    /// waiting
    ///
    /// A byte received with an error ends the call. It is reported as `Err`
    /// only when it would be the first byte; otherwise it stays in the
    /// receive buffer and the bytes read so far are returned.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut count = 0;
        for slot in buf.iter_mut() {
            if count > 0 && (!self.is_rx_data() || !self.pending_errors().is_empty()) {
                break;
            }
            let errors = Usart::read(self, slot);
            if let Some(e) = UsartError::from_errors(errors) {
                return Err(e);
            }
            count += 1;
        }
        Ok(count)
    }
}

impl<const N: u8, const TX: u8, const RX: u8, B: Bus> embedded_io::Write for Usart<N, TX, RX, B> {
    /// Clears the transmit-complete flag ahead of every byte so that
    /// `flush` only sees completion of this data
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &byte in buf {
            while self.is_tx_full() {
                core::hint::spin_loop();
            }
            self.clear_tx_complete();
            Self::TXDATAL.write(&self.bus, byte);
        }
        Ok(buf.len())
    }

    /// Waits until the last frame has left the shift register
    fn flush(&mut self) -> Result<(), Self::Error> {
        while self.is_tx_full() {
            core::hint::spin_loop();
        }
        while !self.is_tx_complete() {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use embedded_io::{Error as _, ErrorKind, Write as _};
    use tinyreg_hal::{baud_register, SimBus};

    const U0: u16 = 0x800;
    const U0_RXDATAH: u16 = U0 + 0x01;
    const U0_TXDATAL: u16 = U0 + 0x02;
    const U0_STATUS: u16 = U0 + 0x04;
    const U0_CTRLB: u16 = U0 + 0x06;
    const U0_CTRLC: u16 = U0 + 0x07;

    fn sim() -> SimBus {
        let sim = SimBus::new();
        for n in 0..4u16 {
            sim.w1c(0x800 + n * 0x20 + 0x04, 0x5A);
        }
        for port in 0..6u16 {
            sim.toggles(port * 4 + 2, port * 4 + 1);
            sim.w1c(port * 4 + 3, 0xFF);
        }
        sim
    }

    fn usart0(bus: &SimBus) -> Usart0<&SimBus> {
        Usart::new(UsartId::new(), PinId::new(), PinId::new(), bus)
    }

    /// USART0 with a receive FIFO and a transmit shifter behind it
    ///
    /// Reading RXDATAL pops the FIFO. A frame written to TXDATAL takes
    /// `FRAME_POLLS` STATUS reads to shift out, then raises TXCIF.
    #[derive(Default)]
    struct Line {
        rx: RefCell<VecDeque<(u8, u8)>>,
        shifting: Cell<u8>,
        txc: Cell<bool>,
        sent: RefCell<Vec<u8>>,
    }

    const FRAME_POLLS: u8 = 3;

    impl Line {
        fn receive(&self, byte: u8, rxdatah: u8) {
            self.rx.borrow_mut().push_back((byte, rxdatah));
        }
    }

    impl Bus for &Line {
        fn read(&self, addr: u16) -> u8 {
            match addr {
                U0_STATUS => {
                    match self.shifting.get() {
                        0 => {}
                        1 => {
                            self.shifting.set(0);
                            self.txc.set(true);
                        }
                        n => self.shifting.set(n - 1),
                    }
                    let mut status = 0x20;
                    if self.txc.get() {
                        status |= 0x40;
                    }
                    if !self.rx.borrow().is_empty() {
                        status |= 0x80;
                    }
                    status
                }
                U0_RXDATAH => self.rx.borrow().front().map_or(0, |&(_, h)| h | 0x80),
                U0 => self.rx.borrow_mut().pop_front().map_or(0, |(d, _)| d),
                _ => 0,
            }
        }

        fn write(&self, addr: u16, value: u8) {
            match addr {
                U0_STATUS if value & 0x40 != 0 => self.txc.set(false),
                U0_TXDATAL => {
                    self.sent.borrow_mut().push(value);
                    self.shifting.set(FRAME_POLLS);
                }
                _ => {}
            }
        }
    }

    fn line_usart0(line: &Line) -> Usart0<&Line> {
        Usart::new(UsartId::new(), PinId::new(), PinId::new(), line)
    }

    #[test]
    fn test_routes() {
        assert_eq!(route(0, PA0, PA1), Some(Route::Default));
        assert_eq!(route(0, PA4, PA5), Some(Route::Alternate));
        assert_eq!(route(3, PB4, PB5), Some(Route::Alternate));
        assert_eq!(route(0, PA0, PA5), None);
        assert_eq!(route(1, PA0, PA1), None);
        assert_eq!(route(4, PA0, PA1), None);
    }

    #[test]
    fn test_on_default_route_keeps_other_instances() {
        let sim = sim();
        // USART0 on its alternate route, USART1..3 routed to none
        sim.poke(USARTROUTEA, 0xFD);

        usart0(&sim).on();

        assert_eq!(sim.peek(USARTROUTEA), 0xFC);
        assert_eq!(sim.writes_to(USARTROUTEA), 1);
    }

    #[test]
    fn test_on_alternate_route() {
        let sim = sim();
        sim.poke(USARTROUTEA, 0xC0);
        let mut u1: Usart1Alt<&SimBus> =
            Usart::new(UsartId::new(), PinId::new(), PinId::new(), &sim);

        u1.on();

        assert_eq!(sim.peek(USARTROUTEA), 0xC4);
        // PC4 output idle high, PC5 input with pull-up
        assert_eq!(sim.peek(0x08), 0x10); // VPORTC.DIR
        assert_eq!(sim.peek(0x09), 0x10); // VPORTC.OUT
        assert_eq!(sim.peek(0x455), 0x08); // PORTC.PIN5CTRL
        assert_eq!(sim.peek(0x820 + 0x06), 0xC0);
    }

    #[test]
    fn test_on_order() {
        let sim = sim();

        usart0(&sim).on();

        assert_eq!(
            sim.writes().as_slice(),
            &[
                (USARTROUTEA, 0x00),
                // TX: PINCTRL, OUT high, DIR output
                (0x410, 0x00),
                (0x01, 0x01),
                (0x00, 0x01),
                // RX: PINCTRL pull-up, DIR input
                (0x411, 0x08),
                (0x00, 0x01),
                (U0_CTRLB, 0xC0),
            ]
        );
    }

    #[test]
    fn test_on_keeps_rx_mode() {
        let sim = sim();
        let mut u0 = usart0(&sim);
        u0.rx_mode(RxMode::Clk2x);

        u0.on();

        assert_eq!(sim.peek(U0_CTRLB), 0xC2);
    }

    #[test]
    fn test_init_one_write_per_register() {
        let sim = sim();
        let mut u0 = usart0(&sim);
        let baud = baud_register(3_333_333, 9600, RxMode::Normal);

        u0.init([
            UsartOption::from(StopBits::Two),
            RxMode::Clk2x.into(),
            UsartOption::Baud(baud),
            Parity::Even.into(),
        ]);

        assert_eq!(sim.writes_to(U0 + 0x08), 1);
        assert_eq!(sim.writes_to(U0 + 0x09), 1);
        assert_eq!(sim.writes_to(U0_CTRLC), 1);
        assert_eq!(sim.writes_to(U0_CTRLB), 1);
        assert_eq!(sim.peek(U0 + 0x08), (baud & 0xFF) as u8);
        assert_eq!(sim.peek(U0 + 0x09), (baud >> 8) as u8);
        assert_eq!(sim.peek(U0_CTRLC), 0x2B);
        assert_eq!(sim.peek(U0_CTRLB), 0x02);
    }

    #[test]
    fn test_init_without_baud_leaves_it() {
        let sim = sim();
        let mut u0 = usart0(&sim);
        u0.baud_reg(1389);
        sim.clear_log();

        u0.init([Parity::Odd]);

        assert_eq!(sim.writes_to(U0 + 0x08), 0);
        assert_eq!(sim.peek(U0_CTRLC), 0x33);
    }

    #[test]
    fn test_state_transitions() {
        let sim = sim();
        let mut u0 = usart0(&sim);
        assert_eq!(u0.state(), UsartState::Disabled);

        u0.baud_reg(1389);
        assert_eq!(u0.state(), UsartState::Configured);

        u0.on();
        assert_eq!(u0.state(), UsartState::Enabled);

        u0.off();
        assert_eq!(u0.state(), UsartState::Configured);
    }

    #[test]
    fn test_write_when_data_register_empty() {
        let sim = sim();
        let mut u0 = usart0(&sim);
        sim.poke(U0_STATUS, 0x20);

        u0.write(b'A');

        assert_eq!(sim.writes().as_slice(), &[(U0 + 0x02, b'A')]);
    }

    #[test]
    fn test_read_returns_errors_with_byte() {
        let sim = sim();
        let mut u0 = usart0(&sim);
        sim.poke(U0_STATUS, 0x80);
        sim.poke(U0 + 0x01, 0x84); // RXCIF | FERR
        sim.poke(U0, 0x55);

        let mut byte = 0;
        let errors = u0.read(&mut byte);

        assert_eq!(byte, 0x55);
        assert!(errors.frame());
        assert!(!errors.parity() && !errors.overflow());
    }

    #[test]
    fn test_read_clean_byte() {
        let sim = sim();
        let mut u0 = usart0(&sim);
        sim.poke(U0_STATUS, 0x80);
        sim.poke(U0 + 0x01, 0x81); // RXCIF | DATA8
        sim.poke(U0, b'z');

        let mut byte = 0;
        assert!(u0.read(&mut byte).is_empty());
        assert_eq!(byte, b'z');
    }

    #[test]
    fn test_clear_tx_complete() {
        let sim = sim();
        let mut u0 = usart0(&sim);
        sim.poke(U0_STATUS, 0x60);
        assert!(u0.is_tx_complete());

        u0.clear_tx_complete();

        assert!(!u0.is_tx_complete());
        assert!(u0.is_tx_empty());
        assert_eq!(sim.peek(U0_STATUS), 0x20);
    }

    #[test]
    fn test_embedded_io() {
        let sim = sim();
        let mut u0 = usart0(&sim);
        sim.poke(U0_STATUS, 0xA0);

        u0.write_all(b"hi").unwrap();
        sim.poke(U0_STATUS, 0xE0); // last frame shifted out
        u0.flush().unwrap();
        let sent: Vec<u8> = sim
            .writes()
            .iter()
            .filter(|(a, _)| *a == U0 + 0x02)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(sent, b"hi");

        sim.poke(U0 + 0x01, 0x82); // PERR
        let mut buf = [0u8; 1];
        let err = embedded_io::Read::read(&mut u0, &mut buf).unwrap_err();
        assert_eq!(err, UsartError::Parity);
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        sim.poke(U0 + 0x01, 0xC0); // BUFOVF
        let err = embedded_io::Read::read(&mut u0, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_free_returns_tokens() {
        let sim = sim();
        let (_, tx, rx) = usart0(&sim).free();
        assert_eq!((tx.id(), rx.id()), (PA0, PA1));
    }

    #[test]
    fn test_read_keeps_bad_byte_after_good_ones() {
        let line = Line::default();
        let mut u0 = line_usart0(&line);
        line.receive(0x55, 0);
        line.receive(0x66, RxErrors::FRAME);

        let mut buf = [0u8; 2];
        let n = embedded_io::Read::read(&mut u0, &mut buf).unwrap();

        assert_eq!(n, 1);
        assert_eq!(buf[0], 0x55);
        assert_eq!(line.rx.borrow().len(), 1);

        // The bad byte is reported by the next call, and consumed
        let err = embedded_io::Read::read(&mut u0, &mut buf).unwrap_err();
        assert_eq!(err, UsartError::Frame);
        assert!(line.rx.borrow().is_empty());
    }

    #[test]
    fn test_read_takes_all_waiting_clean_bytes() {
        let line = Line::default();
        let mut u0 = line_usart0(&line);
        for byte in *b"abc" {
            line.receive(byte, 0);
        }

        let mut buf = [0u8; 8];
        let n = embedded_io::Read::read(&mut u0, &mut buf).unwrap();

        assert_eq!(&buf[..n], b"abc");
    }

    #[test]
    fn test_flush_waits_for_last_frame() {
        let line = Line::default();
        let mut u0 = line_usart0(&line);
        // Stale completion from an earlier transfer
        line.txc.set(true);

        u0.write_all(b"ok").unwrap();
        assert!(!line.txc.get());

        u0.flush().unwrap();

        assert_eq!(line.sent.borrow().as_slice(), b"ok");
        assert_eq!(line.shifting.get(), 0);
        assert!(u0.is_tx_complete());
    }
}
