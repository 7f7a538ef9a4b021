//! Interrupt handler slots
//!
//! One slot per vector the facades of this crate can raise. Port vectors
//! are shared by all pins of the port; the handler finds the source with
//! `Pin::is_flag` and must clear it with `Pin::clear_flag`, hardware does
//! not. `USARTn_TXC` likewise needs `Usart::clear_tx_complete`, while RXC
//! and DRE clear by reading or writing data.
//!
//! ```ignore
//! #[avr_device::interrupt(atmega4809)]
//! fn USART0_RXC() {
//!     tinyreg_hal_mega4809::interrupt::USART0_RXC.dispatch();
//! }
//! ```

use tinyreg_hal::Vector;

pub static PORTA: Vector = Vector::new();
pub static PORTB: Vector = Vector::new();
pub static PORTC: Vector = Vector::new();
pub static PORTD: Vector = Vector::new();
pub static PORTE: Vector = Vector::new();
pub static PORTF: Vector = Vector::new();

pub static USART0_RXC: Vector = Vector::new();
pub static USART0_DRE: Vector = Vector::new();
pub static USART0_TXC: Vector = Vector::new();
pub static USART1_RXC: Vector = Vector::new();
pub static USART1_DRE: Vector = Vector::new();
pub static USART1_TXC: Vector = Vector::new();
pub static USART2_RXC: Vector = Vector::new();
pub static USART2_DRE: Vector = Vector::new();
pub static USART2_TXC: Vector = Vector::new();
pub static USART3_RXC: Vector = Vector::new();
pub static USART3_DRE: Vector = Vector::new();
pub static USART3_TXC: Vector = Vector::new();
