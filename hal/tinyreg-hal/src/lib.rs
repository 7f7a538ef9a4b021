//! Tinyreg Hardware Abstraction Layer
//!
//! Device-independent building blocks for memory-mapped peripheral
//! registers on 8-bit AVR microcontrollers. Chip crates supply the address
//! tables and the facades; this crate supplies the pieces every facade is
//! made of.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pins, comparator, usart)  │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ tinyreg-hal-  │       │ tinyreg-hal-  │
//! │   mega328p    │       │   mega4809    │
//! └───────────────┘       └───────────────┘
//!         │                       │
//!         └───────────┬───────────┘
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tinyreg-hal (this crate)               │
//! │  resolve → register view → options      │
//! │            │                            │
//! │            ▼                            │
//! │           Bus (Mmio / SimBus)           │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`bus`] - The single volatile access primitive
//! - [`register`] - Byte registers and typed bit-fields
//! - [`resolve`] - Compile-time identifier to address resolution
//! - [`gpio`] - Pin option set and merger
//! - [`uart`] - Usart option set, merger and receive error mask
//! - [`irq`] - Registrable interrupt handler slots
//!
//! # Concurrency
//!
//! Register writes are not atomic with respect to interrupt handlers. A
//! caller configuring a register that an active handler also touches must
//! wrap the configuration in [`irq::free`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod gpio;
pub mod irq;
pub mod register;
pub mod resolve;
pub mod uart;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

// Re-export key types at crate root for convenience
pub use bus::{Bus, Mmio};
pub use gpio::{InitVal, Invert, IoMode, IscMode, PinConfig, PinOption, Pullup};
pub use irq::{InterruptHandler, Vector};
pub use register::{Field, Register, Register16};
pub use resolve::{InstanceLayout, PortLayout, Resolved};
pub use uart::{baud_register, DataBits, Parity, RxErrors, RxMode, StopBits, UsartConfig, UsartOption};

#[cfg(any(test, feature = "sim"))]
pub use sim::SimBus;
