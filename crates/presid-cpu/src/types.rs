//! Core types for the 6502 execution model.

use std::fmt::{self, Display};

use crate::Result;

/// Size of the 16-bit address space.
pub const ADDRESS_SPACE_SIZE: usize = 1 << 16;

/// Base address of the hardware stack page.
pub const STACK_PAGE: u16 = 0x0100;

/// Stack pointer value right after reset.
pub const STACK_RESET: u8 = 0xFD;

/// Reset vector location.
pub const RESET_VECTOR: u16 = 0xFFFC;

/// IRQ/BRK vector location.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Program counter that no well-formed routine executes from.
///
/// A return address of `0xFFFE` pushed on the stack makes `RTS` land here.
pub const RETURN_SENTINEL: u16 = 0xFFFF;

// Status register flags
pub const FLAG_CARRY: u8 = 0x01;
pub const FLAG_ZERO: u8 = 0x02;
pub const FLAG_INTERRUPT: u8 = 0x04;
pub const FLAG_DECIMAL: u8 = 0x08;
pub const FLAG_BREAK: u8 = 0x10;
pub const FLAG_UNUSED: u8 = 0x20;
pub const FLAG_OVERFLOW: u8 = 0x40;
pub const FLAG_NEGATIVE: u8 = 0x80;

/// Memory access capability used by the CPU core.
///
/// These two methods are the only way a core observes or mutates memory.
pub trait Bus {
    /// Read a byte.
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte.
    fn write(&mut self, addr: u16, value: u8);
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn read(&mut self, addr: u16) -> u8 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        (**self).write(addr, value);
    }
}

/// Instruction stepper driven by an execution harness.
///
/// Register state must be settable between `reset()` and the first `step()`
/// so that callers can emulate a subroutine call without a `JSR`.
pub trait CpuCore {
    /// Load the power-on register state (reads the reset vector via `bus`).
    fn reset<B: Bus + ?Sized>(&mut self, bus: &mut B);

    /// Execute exactly one instruction.
    ///
    /// # Errors
    ///
    /// Returns an error if the core cannot execute the opcode at PC.
    fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<()>;

    /// Current program counter.
    #[must_use]
    fn pc(&self) -> u16;

    fn set_pc(&mut self, pc: u16);

    fn set_accumulator(&mut self, value: u8);

    fn set_stack_pointer(&mut self, sp: u8);

    fn set_status(&mut self, status: u8);

    /// Whether `pc` is the terminal address of a run-until-return call.
    #[must_use]
    fn is_return_sentinel(&self, pc: u16) -> bool {
        pc == RETURN_SENTINEL
    }
}

/// 6502 register file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub status: u8,
    pub pc: u16,
}

impl Registers {
    /// Power-on register state (before the reset vector is read).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: STACK_RESET,
            status: FLAG_UNUSED | FLAG_INTERRUPT,
            pc: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn flag(self, flag: u8) -> bool {
        self.status & flag != 0
    }

    #[inline]
    pub const fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    /// Update N and Z from a result byte.
    #[inline]
    pub const fn set_nz(&mut self, value: u8) {
        self.set_flag(FLAG_ZERO, value == 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PC={:04X} A={:02X} X={:02X} Y={:02X} SP={:02X} P={:02X}",
            self.pc, self.a, self.x, self.y, self.sp, self.status
        )
    }
}
