//! ATmega4809 facades for the tinyreg HAL
//!
//! Covers the 48-pin package of the megaAVR 0-series:
//!
//! - [`pins`] - Pin identifiers (`id = port * 8 + bit`, ports A..F)
//! - [`port`] - [`Pin`](port::Pin) facade over VPORTx and PORTx.PINnCTRL,
//!   configured through [`Pin::init`](port::Pin::init)
//! - [`usart`] - [`Usart`](usart::Usart) facade for USART0..USART3 on their
//!   default or alternate pin routes
//! - [`interrupt`] - Handler slots for the runtime's vector functions
//!
//! # Usage
//!
//! ```ignore
//! use tinyreg_hal::{IoMode, Invert, Mmio, PinOption, Pullup};
//! use tinyreg_hal_mega4809::{port::Pin, usart::Usart0, Peripherals};
//!
//! let p = Peripherals::take().unwrap();
//!
//! // Options in any order, one write per register
//! let mut sw = Pin::new(p.pins.pa2, Mmio);
//! sw.init([PinOption::from(Invert::LowIsOn), IoMode::Input.into(), Pullup::On.into()]);
//!
//! let mut u0 = Usart0::new(p.usart0, p.pins.pa0, p.pins.pa1, Mmio);
//! u0.baud_reg(tinyreg_hal::baud_register(3_333_333, 9600, tinyreg_hal::RxMode::Normal));
//! u0.on();
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod interrupt;
pub mod peripherals;
pub mod pins;
pub mod port;
pub mod usart;

pub use peripherals::Peripherals;
pub use port::Pin;
pub use usart::{Usart, UsartError, UsartState};
