//! Patch program synthesis.
//!
//! Turns the set of changed cells of an [`presid_state::AddressSpace`] into
//! a short 6502 routine of immediate loads, increments and absolute stores
//! that replays those changes, ending in `RTS`.
//!
//! Stores are grouped by value: all cells holding value `v` are stored
//! back-to-back, and a group for `v + 1` that directly follows a group for
//! `v` reuses the index register with a single increment.

mod config;
mod instr;
mod synth;

pub use config::{IndexRegister, SynthConfig};
pub use instr::PatchInstr;
pub use synth::{PatchProgram, PatchStats, synthesize};
