//! MOS 6502 instruction set definitions and stepping core.
//!
//! This crate provides the opcode table, the native encodings used when
//! emitting 6502 code, and `Mos6502`, an interpreter that executes one
//! instruction per `step()` against any [`Bus`] implementation.
//!
//! The interpreter never owns memory. Every instruction fetch, operand read,
//! stack push and store goes through the bus, which lets callers observe
//! or instrument all memory traffic.
//!
//! ```
//! use presid_cpu::{Bus, CpuCore, FlatMemory, Mos6502};
//!
//! let mut memory = FlatMemory::new();
//! // LDA #$2A; STA $0200
//! memory.load(0x1000, &[0xA9, 0x2A, 0x8D, 0x00, 0x02]);
//!
//! let mut cpu = Mos6502::new();
//! cpu.set_pc(0x1000);
//! cpu.step(&mut memory).unwrap();
//! cpu.step(&mut memory).unwrap();
//! assert_eq!(memory.read(0x0200), 0x2A);
//! ```

mod cpu;
mod decode;
mod encode;
mod memory;
mod types;

pub use cpu::Mos6502;
pub use decode::{AddrMode, Mnemonic, OpInfo, decode};
pub use encode::*;
pub use memory::FlatMemory;
pub use types::*;

use thiserror::Error;

/// CPU execution errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    #[error("unsupported opcode {opcode:#04x} at {pc:#06x}")]
    UnsupportedOpcode { opcode: u8, pc: u16 },
}

pub type Result<T> = std::result::Result<T, CpuError>;
