//! Simulated register bus for host testing
//!
//! [`SimBus`] backs the register map with plain memory, logs every write in
//! order, and models the two write side effects the facades rely on:
//!
//! - write-1-to-clear bits (interrupt and status flags)
//! - write-1-to-toggle redirection (writing the IN register toggles OUT)
//!
//! Reads have no side effects. Status bits a facade waits on must be set up
//! front with [`SimBus::poke`].

use core::cell::{Cell, RefCell};

use heapless::Vec;

use crate::bus::Bus;

/// Size of the simulated data space
pub const SIM_MEMORY_SIZE: usize = 0x1000;

/// Maximum number of writes kept in the log
pub const LOG_CAPACITY: usize = 256;

/// Maximum number of side-effect rules
const MAX_EFFECTS: usize = 32;

/// Write side effect attached to one address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    /// Bits in the mask are cleared by writing 1
    ClearOnOne(u8),
    /// Writes are XORed into another address instead of stored
    ToggleInto(u16),
}

/// Host-side register memory with a write log
///
/// # Panics
///
/// A write beyond [`LOG_CAPACITY`] entries, or more than 32 side-effect
/// rules, panics instead of dropping the entry.
pub struct SimBus {
    memory: [Cell<u8>; SIM_MEMORY_SIZE],
    log: RefCell<Vec<(u16, u8), LOG_CAPACITY>>,
    effects: RefCell<Vec<(u16, Effect), MAX_EFFECTS>>,
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBus {
    /// Create a bus with all registers zeroed and no side effects
    pub fn new() -> Self {
        Self {
            memory: [const { Cell::new(0) }; SIM_MEMORY_SIZE],
            log: RefCell::new(Vec::new()),
            effects: RefCell::new(Vec::new()),
        }
    }

    /// Mark bits of `addr` as write-1-to-clear
    pub fn w1c(&self, addr: u16, mask: u8) -> &Self {
        self.add_effect(addr, Effect::ClearOnOne(mask));
        self
    }

    /// Make writes to `addr` toggle the bits of `target`
    pub fn toggles(&self, addr: u16, target: u16) -> &Self {
        self.add_effect(addr, Effect::ToggleInto(target));
        self
    }

    fn add_effect(&self, addr: u16, effect: Effect) {
        self.effects
            .borrow_mut()
            .push((addr, effect))
            .expect("sim effect table full");
    }

    /// Read memory without logging
    pub fn peek(&self, addr: u16) -> u8 {
        self.memory[addr as usize].get()
    }

    /// Set memory without logging or side effects
    pub fn poke(&self, addr: u16, value: u8) {
        self.memory[addr as usize].set(value);
    }

    /// All logged writes, oldest first
    pub fn writes(&self) -> Vec<(u16, u8), LOG_CAPACITY> {
        self.log.borrow().clone()
    }

    /// Number of logged writes to one address
    pub fn writes_to(&self, addr: u16) -> usize {
        self.log.borrow().iter().filter(|(a, _)| *a == addr).count()
    }

    /// Forget all logged writes
    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    fn effect(&self, addr: u16) -> Option<Effect> {
        self.effects
            .borrow()
            .iter()
            .find(|(a, _)| *a == addr)
            .map(|(_, e)| *e)
    }
}

impl Bus for &SimBus {
    fn read(&self, addr: u16) -> u8 {
        self.peek(addr)
    }

    fn write(&self, addr: u16, value: u8) {
        self.log
            .borrow_mut()
            .push((addr, value))
            .expect("sim log full; call clear_log between phases");

        match self.effect(addr) {
            Some(Effect::ClearOnOne(mask)) => {
                let current = self.peek(addr);
                let kept = current & mask & !value;
                self.poke(addr, (value & !mask) | kept);
            }
            Some(Effect::ToggleInto(target)) => {
                self.poke(target, self.peek(target) ^ value);
            }
            None => self.poke(addr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_write_is_stored_and_logged() {
        let sim = SimBus::new();
        (&sim).write(0x24, 0x80);

        assert_eq!(sim.peek(0x24), 0x80);
        assert_eq!(sim.writes_to(0x24), 1);
    }

    #[test]
    fn test_w1c_only_clears_written_ones() {
        let sim = SimBus::new();
        sim.w1c(0x03, 0xFF);
        sim.poke(0x03, 0b1010_0001);

        (&sim).write(0x03, 0b0000_0001);
        assert_eq!(sim.peek(0x03), 0b1010_0000);

        // Writing zeros changes nothing
        (&sim).write(0x03, 0);
        assert_eq!(sim.peek(0x03), 0b1010_0000);
    }

    #[test]
    fn test_w1c_mixed_register_keeps_plain_bits_written() {
        let sim = SimBus::new();
        // Only bit 4 is a flag
        sim.w1c(0x50, 0x10);
        sim.poke(0x50, 0x10);

        (&sim).write(0x50, 0x18);
        assert_eq!(sim.peek(0x50), 0x08);
    }

    #[test]
    fn test_toggle_redirect() {
        let sim = SimBus::new();
        sim.toggles(0x23, 0x25);
        sim.poke(0x23, 0x55);

        (&sim).write(0x23, 0x80);
        assert_eq!(sim.peek(0x25), 0x80);
        (&sim).write(0x23, 0x80);
        assert_eq!(sim.peek(0x25), 0x00);
        // IN itself is untouched by the write
        assert_eq!(sim.peek(0x23), 0x55);
    }

    #[test]
    fn test_log_holds_capacity_writes() {
        let sim = SimBus::new();
        for i in 0..LOG_CAPACITY {
            (&sim).write(0x100, i as u8);
        }
        assert_eq!(sim.writes_to(0x100), LOG_CAPACITY);

        sim.clear_log();
        (&sim).write(0x100, 0xAA);
        assert_eq!(sim.writes().as_slice(), &[(0x100, 0xAA)]);
    }

    #[test]
    #[should_panic(expected = "sim log full")]
    fn test_log_overflow_panics() {
        let sim = SimBus::new();
        for i in 0..=LOG_CAPACITY {
            (&sim).write(0x100, i as u8);
        }
    }

    #[test]
    #[should_panic(expected = "sim effect table full")]
    fn test_effect_table_overflow_panics() {
        let sim = SimBus::new();
        for addr in 0..=MAX_EFFECTS as u16 {
            sim.w1c(addr, 0x01);
        }
    }
}
