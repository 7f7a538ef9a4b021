//! Interrupt handler slots
//!
//! Forward the runtime's vector functions here:
//!
//! ```ignore
//! #[avr_device::interrupt(atmega328p)]
//! fn ANALOG_COMP() {
//!     tinyreg_hal_mega328p::interrupt::ANALOG_COMP.dispatch();
//! }
//! ```

use tinyreg_hal::Vector;

/// Analog comparator; hardware clears ACI when the vector is taken
pub static ANALOG_COMP: Vector = Vector::new();
