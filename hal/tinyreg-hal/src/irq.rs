//! Interrupt handler slots
//!
//! The core never owns the vector table. Each chip crate declares one
//! [`Vector`] per interrupt source it exposes; the runtime's real vector
//! function forwards to [`Vector::dispatch`], which calls whatever handler
//! the application registered.
//!
//! ```ignore
//! #[avr_device::interrupt(atmega328p)]
//! fn ANALOG_COMP() {
//!     tinyreg_hal_mega328p::interrupt::ANALOG_COMP.dispatch();
//! }
//! ```
//!
//! Flag handling stays with the handler: some sources clear their flag in
//! hardware when the vector is taken, others need an explicit
//! `clear_flag()`.

use core::cell::Cell;

use critical_section::Mutex;

/// Code run when an interrupt fires
pub trait InterruptHandler: Sync {
    fn on_interrupt(&self);
}

/// Registrable handler slot for one interrupt source
pub struct Vector {
    handler: Mutex<Cell<Option<&'static dyn InterruptHandler>>>,
}

impl Default for Vector {
    fn default() -> Self {
        Self::new()
    }
}

impl Vector {
    /// Empty slot
    pub const fn new() -> Self {
        Self {
            handler: Mutex::new(Cell::new(None)),
        }
    }

    /// Install a handler, returning the one it replaces
    pub fn register(
        &self,
        handler: &'static dyn InterruptHandler,
    ) -> Option<&'static dyn InterruptHandler> {
        critical_section::with(|cs| self.handler.borrow(cs).replace(Some(handler)))
    }

    /// Remove the installed handler
    pub fn unregister(&self) -> Option<&'static dyn InterruptHandler> {
        critical_section::with(|cs| self.handler.borrow(cs).take())
    }

    /// Whether a handler is installed
    pub fn is_registered(&self) -> bool {
        critical_section::with(|cs| self.handler.borrow(cs).get().is_some())
    }

    /// Run the installed handler
    ///
    /// Called from the vector function. Returns `false` if the slot is
    /// empty.
    pub fn dispatch(&self) -> bool {
        let handler = critical_section::with(|cs| self.handler.borrow(cs).get());
        match handler {
            Some(h) => {
                h.on_interrupt();
                true
            }
            None => false,
        }
    }
}

/// Run `f` with interrupts excluded
///
/// Wrap any configuration of a register that an active interrupt handler
/// also touches; facades do not do this on their own.
pub fn free<R>(f: impl FnOnce(critical_section::CriticalSection) -> R) -> R {
    critical_section::with(f)
}
