//! Value-grouping patch synthesizer.

use std::fmt::{self, Display};

use presid_state::{AddressSpace, CellState};
use tracing::debug;

use crate::{IndexRegister, PatchInstr, SynthConfig};

/// Instruction counts of a synthesized program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchStats {
    pub loads: usize,
    pub increments: usize,
    pub stores: usize,
    pub bytes: usize,
}

/// Immutable patch routine ending in `RTS`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchProgram {
    instrs: Vec<PatchInstr>,
}

impl PatchProgram {
    #[must_use]
    pub fn instructions(&self) -> &[PatchInstr] {
        &self.instrs
    }

    /// Native byte encoding, directly executable by a 6502.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        for instr in &self.instrs {
            instr.encode_into(&mut out);
        }
        out
    }

    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.instrs.iter().copied().map(PatchInstr::size).sum()
    }

    #[must_use]
    pub fn stats(&self) -> PatchStats {
        let mut stats = PatchStats {
            bytes: self.byte_len(),
            ..PatchStats::default()
        };
        for instr in &self.instrs {
            match instr {
                PatchInstr::LoadImmediate { .. } => stats.loads += 1,
                PatchInstr::Increment { .. } => stats.increments += 1,
                PatchInstr::StoreAbsolute { .. } => stats.stores += 1,
                PatchInstr::Return => {}
            }
        }
        stats
    }
}

impl Display for PatchProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instrs {
            writeln!(f, "{instr}")?;
        }
        Ok(())
    }
}

/// Encode every cell whose state satisfies `predicate` as a patch program.
///
/// Candidate values are visited in ascending order; within a value, stores
/// follow ascending addresses. A value group is introduced by an increment
/// when the previous candidate value produced at least one store, and by an
/// immediate load otherwise.
#[must_use]
pub fn synthesize<F>(space: &AddressSpace, predicate: F, config: &SynthConfig) -> PatchProgram
where
    F: Fn(CellState) -> bool,
{
    let reg: IndexRegister = config.register;

    // Bucket changed addresses by final value, preserving address order.
    let mut groups: Vec<Vec<u16>> = vec![Vec::new(); 256];
    for addr in space.changed(predicate) {
        groups[usize::from(space.peek(addr))].push(addr);
    }

    let mut instrs = Vec::new();
    let mut previous: Option<u8> = config.assume_zero_register.then_some(0);

    for (value, addrs) in (0..=u8::MAX).zip(&groups) {
        if addrs.is_empty() {
            continue;
        }

        let chained = previous.and_then(|p| p.checked_add(1)) == Some(value);
        if chained {
            instrs.push(PatchInstr::Increment { reg });
        } else {
            instrs.push(PatchInstr::LoadImmediate { reg, value });
        }

        instrs.extend(
            addrs
                .iter()
                .map(|&addr| PatchInstr::StoreAbsolute { reg, addr }),
        );
        previous = Some(value);
    }

    instrs.push(PatchInstr::Return);

    let program = PatchProgram { instrs };
    let stats = program.stats();
    debug!(
        stores = stats.stores,
        loads = stats.loads,
        increments = stats.increments,
        bytes = stats.bytes,
        register = %reg,
        "synthesized patch program"
    );
    program
}
