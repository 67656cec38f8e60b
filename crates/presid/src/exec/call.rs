//! Run-until-return mode.

use presid_cpu::{CpuCore, STACK_RESET};
use presid_state::AddressSpace;
use tracing::trace;

use super::{ExecError, Result};

/// Stack cell holding the low byte of the sentinel return address.
pub const SENTINEL_LO: u16 = 0x01FE;
/// Stack cell holding the high byte of the sentinel return address.
pub const SENTINEL_HI: u16 = 0x01FF;

/// Outcome of one emulated subroutine call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallSummary {
    pub steps: u64,
    /// Both sentinel cells were accessed exactly once and have been cleared.
    pub balanced: bool,
}

/// Call the routine at `entry` with `accumulator` in A and step until it
/// returns.
///
/// The stack is seeded with return address `$FFFE` so the routine's `RTS`
/// lands on the sentinel PC. If each sentinel cell was touched exactly once
/// their instrumentation is wiped; otherwise it stays visible and the
/// summary reports the call as unbalanced.
///
/// # Errors
///
/// Returns [`ExecError::SanityExhausted`] after `max_steps` instructions
/// without returning, or [`ExecError::Cpu`] on a CPU fault.
pub fn run_until_return<C: CpuCore>(
    cpu: &mut C,
    space: &mut AddressSpace,
    entry: u16,
    accumulator: u8,
    max_steps: u64,
) -> Result<CallSummary> {
    cpu.set_pc(entry);
    cpu.set_accumulator(accumulator);
    cpu.set_stack_pointer(STACK_RESET);
    cpu.set_status(0);
    space.poke(SENTINEL_LO, 0xFE);
    space.poke(SENTINEL_HI, 0xFF);

    let mut steps = 0u64;
    while !cpu.is_return_sentinel(cpu.pc()) {
        if steps >= max_steps {
            return Err(ExecError::SanityExhausted { steps });
        }
        cpu.step(&mut space.bus())?;
        steps += 1;
    }

    let balanced = space.access_count(SENTINEL_LO) == 1 && space.access_count(SENTINEL_HI) == 1;
    if balanced {
        space.clear_cell(SENTINEL_LO);
        space.clear_cell(SENTINEL_HI);
    }

    trace!(
        entry = format_args!("{entry:#06x}"),
        steps,
        balanced,
        "call returned"
    );
    Ok(CallSummary { steps, balanced })
}
