//! ATmega328P facades for the tinyreg HAL
//!
//! This crate maps the ATmega328P's fixed register table onto the generic
//! building blocks of `tinyreg-hal`:
//!
//! - [`pins`] - Pin identifiers (`id = port * 8 + bit`) and ownership tokens
//! - [`port`] - [`Pin`](port::Pin) facade over PINx/DDRx/PORTx
//! - [`ac`] - [`AnalogComparator`](ac::AnalogComparator) facade
//! - [`interrupt`] - Handler slots for the runtime's vector functions
//!
//! # Usage
//!
//! ```ignore
//! use tinyreg_hal::{Invert, Mmio};
//! use tinyreg_hal_mega328p::{port::Pin, Peripherals};
//!
//! let p = Peripherals::take().unwrap();
//! let mut led = Pin::new(p.pins.pb7, Invert::LowIsOn, Mmio);
//! led.off();
//! led.output();
//! led.toggle();
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod ac;
pub mod interrupt;
pub mod peripherals;
pub mod pins;
pub mod port;

pub use ac::AnalogComparator;
pub use peripherals::Peripherals;
pub use port::Pin;
