//! Register views
//!
//! A [`Register`] is one byte of a peripheral register block at a fixed
//! address. A [`Field`] is a named bit range inside it, tagged with an
//! access class that decides which operations exist:
//!
//! | Class               | get | set | clear | toggle |
//! |---------------------|-----|-----|-------|--------|
//! | [`ReadWrite`]       | yes | yes |       |        |
//! | [`ReadOnly`]        | yes |     |       |        |
//! | [`WriteOneToClear`] | yes |     | yes   |        |
//! | [`ReadToggle`]      | yes |     |       | yes    |
//!
//! Field layouts are `tock-registers` bit-fields, either declared with
//! [`register_bitfields!`](tock_registers::register_bitfields) for a fixed
//! register or built with [`Field::new`] when the bit position depends on a
//! const parameter. Decoding and merging go through a [`LocalRegisterCopy`]
//! taken from one [`Bus`] read.
//!
//! Single-field writes are read-modify-write of the containing byte. Any
//! write-1-to-clear bits of that byte are written as 0 so that a pending
//! flag is never cleared as a side effect of changing a neighbour.
//!
//! [`ReadWrite`]: access::ReadWrite
//! [`ReadOnly`]: access::ReadOnly
//! [`WriteOneToClear`]: access::WriteOneToClear
//! [`ReadToggle`]: access::ReadToggle

use core::marker::PhantomData;

use tock_registers::fields::{Field as BitField, FieldValue};
use tock_registers::{LocalRegisterCopy, RegisterLongName};

use crate::bus::Bus;

/// Field access classes
pub mod access {
    /// Ordinary read/write bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ReadWrite;

    /// Status bits the hardware owns
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ReadOnly;

    /// Latched flags, cleared by writing 1
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WriteOneToClear;

    /// Input level bits where writing 1 toggles the output latch
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ReadToggle;

    /// Access classes that can be read back
    pub trait Readable {}

    impl Readable for ReadWrite {}
    impl Readable for ReadOnly {}
    impl Readable for WriteOneToClear {}
    impl Readable for ReadToggle {}
}

use access::{ReadToggle, ReadWrite, Readable, WriteOneToClear};

/// One byte register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    addr: u16,
    w1c: u8,
}

impl Register {
    /// Register at `addr` with no write-1-to-clear bits
    pub const fn at(addr: u16) -> Self {
        Self { addr, w1c: 0 }
    }

    /// Mark the bits of `mask` as write-1-to-clear
    pub const fn with_w1c(self, mask: u8) -> Self {
        Self {
            addr: self.addr,
            w1c: mask,
        }
    }

    /// Data-space address
    pub const fn addr(&self) -> u16 {
        self.addr
    }

    /// Write-1-to-clear mask
    pub const fn w1c_mask(&self) -> u8 {
        self.w1c
    }

    /// Read the whole byte
    #[inline]
    pub fn read<B: Bus>(&self, bus: &B) -> u8 {
        bus.read(self.addr)
    }

    /// Write the whole byte
    #[inline]
    pub fn write<B: Bus>(&self, bus: &B, value: u8) {
        bus.write(self.addr, value);
    }

    /// Take a local copy of the byte for field decoding
    #[inline]
    pub fn copy<R: RegisterLongName, B: Bus>(&self, bus: &B) -> LocalRegisterCopy<u8, R> {
        LocalRegisterCopy::new(bus.read(self.addr))
    }

    /// Write a whole byte assembled from field values
    ///
    /// Bits outside the fields are written as 0.
    #[inline]
    pub fn write_fields<R: RegisterLongName, B: Bus>(&self, bus: &B, value: FieldValue<u8, R>) {
        bus.write(self.addr, value.value);
    }

    /// Replace the fields named in `value`, one read and one write
    #[inline]
    pub fn modify<R: RegisterLongName, B: Bus>(&self, bus: &B, value: FieldValue<u8, R>) {
        let mut copy = LocalRegisterCopy::<u8, R>::new(bus.read(self.addr) & !self.w1c);
        copy.modify(value);
        bus.write(self.addr, copy.get());
    }

    /// Clear latched flags
    ///
    /// Writes 1 to `flags`, 0 to every other write-1-to-clear bit and the
    /// current value to everything else. A register made only of flags is
    /// written without being read.
    #[inline]
    pub fn clear_flags<B: Bus>(&self, bus: &B, flags: u8) {
        debug_assert!(flags & !self.w1c == 0, "not a write-1-to-clear bit");
        if self.w1c == 0xFF {
            bus.write(self.addr, flags);
        } else {
            let current = bus.read(self.addr);
            bus.write(self.addr, (current & !self.w1c) | flags);
        }
    }
}

/// Sixteen-bit register pair, low byte at the lower address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register16 {
    addr: u16,
}

impl Register16 {
    pub const fn at(addr: u16) -> Self {
        Self { addr }
    }

    pub const fn addr(&self) -> u16 {
        self.addr
    }

    #[inline]
    pub fn read<B: Bus>(&self, bus: &B) -> u16 {
        bus.read16(self.addr)
    }

    #[inline]
    pub fn write<B: Bus>(&self, bus: &B, value: u16) {
        bus.write16(self.addr, value);
    }
}

/// Named bit range of a register
///
/// `R` ties the field to a `register_bitfields!` layout so that field values
/// of different registers cannot be combined. Fields whose position depends
/// on a const parameter use the untyped layout `()`.
pub struct Field<A, R: RegisterLongName = ()> {
    reg: Register,
    bits: BitField<u8, R>,
    _access: PhantomData<A>,
}

impl<A, R: RegisterLongName> Field<A, R> {
    /// Field of `width` bits starting at bit `shift`
    pub const fn new(reg: Register, shift: u8, width: u8) -> Self {
        assert!(width > 0 && shift + width <= 8, "field does not fit in a byte");
        Self::of(reg, BitField::new(((1u16 << width) - 1) as u8, shift as usize))
    }

    /// Single-bit field
    pub const fn bit(reg: Register, bit: u8) -> Self {
        Self::new(reg, bit, 1)
    }

    /// Field declared with `register_bitfields!`, placed in `reg`
    pub const fn of(reg: Register, bits: BitField<u8, R>) -> Self {
        Self {
            reg,
            bits,
            _access: PhantomData,
        }
    }

    /// Containing register
    pub const fn register(&self) -> Register {
        self.reg
    }

    /// Lowest bit position
    pub const fn shift(&self) -> u8 {
        self.bits.shift as u8
    }

    /// Mask of the field within its byte
    pub const fn mask(&self) -> u8 {
        self.bits.mask << self.bits.shift
    }

    /// Field value for [`Register::modify`] or [`Register::write_fields`]
    #[inline]
    pub fn val(&self, value: u8) -> FieldValue<u8, R> {
        self.bits.val(value)
    }

    /// Place a field value at its bit position
    #[inline]
    pub fn encode(&self, value: u8) -> u8 {
        self.val(value).value
    }

    /// Extract the field value from a whole register byte
    #[inline]
    pub fn decode(&self, byte: u8) -> u8 {
        LocalRegisterCopy::<u8, R>::new(byte).read(self.bits)
    }
}

impl<A: Readable, R: RegisterLongName> Field<A, R> {
    /// Read the field value
    #[inline]
    pub fn get<B: Bus>(&self, bus: &B) -> u8 {
        self.reg.copy::<R, B>(bus).read(self.bits)
    }

    /// Whether any bit of the field is set
    #[inline]
    pub fn is_set<B: Bus>(&self, bus: &B) -> bool {
        self.reg.copy::<R, B>(bus).is_set(self.bits)
    }
}

impl<R: RegisterLongName> Field<ReadWrite, R> {
    /// Write the field, leaving the rest of the byte as it is
    #[inline]
    pub fn set<B: Bus>(&self, bus: &B, value: u8) {
        self.reg.modify(bus, self.val(value));
    }
}

impl<R: RegisterLongName> Field<WriteOneToClear, R> {
    /// Clear the latched flag
    #[inline]
    pub fn clear<B: Bus>(&self, bus: &B) {
        self.reg.clear_flags(bus, self.mask());
    }
}

impl<R: RegisterLongName> Field<ReadToggle, R> {
    /// Toggle the output latch behind this bit
    ///
    /// Writes the bit alone; a read-modify-write here would toggle every
    /// other pin that currently reads high.
    #[inline]
    pub fn toggle<B: Bus>(&self, bus: &B) {
        self.reg.write(bus, self.mask());
    }
}
