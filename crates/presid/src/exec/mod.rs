//! Execution controller.
//!
//! Drives a [`CpuCore`](presid_cpu::CpuCore) over an instrumented
//! [`AddressSpace`](presid_state::AddressSpace) in one of two modes:
//!
//! - [`run_frames`]: free-run from an entry point until a frame counter,
//!   updated whenever a flip-flop cell changes, reaches a target.
//! - [`run_until_return`]: emulate a `JSR` by seeding a sentinel return
//!   address on the stack and stepping until the routine's `RTS` lands on it.
//!
//! Both modes share a hard step ceiling; exhausting it is fatal.

mod call;
mod error;
mod frame;

#[cfg(test)]
pub(crate) mod test_support;

pub use call::{CallSummary, SENTINEL_HI, SENTINEL_LO, run_until_return};
pub use error::ExecError;
pub use frame::{FrameSetup, FrameSummary, run_frames};

pub type Result<T> = std::result::Result<T, ExecError>;

/// Default step ceiling.
pub const DEFAULT_MAX_STEPS: u64 = 100_000_000;

/// Execution configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecConfig {
    /// Hard ceiling on instructions per run.
    pub max_steps: u64,
    /// Value every cell holds at session start.
    pub fill: u8,
    /// Emit a progress log line every this many frames (0 = never).
    pub progress_interval: u32,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            fill: 0,
            progress_interval: 1000,
        }
    }
}

impl ExecConfig {
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub const fn with_fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }

    /// Whether `frame` falls on a progress boundary.
    pub(crate) fn is_progress_frame(&self, frame: u32) -> bool {
        frame.checked_rem(self.progress_interval) == Some(0)
    }
}

/// Receives progress from long runs.
pub trait FrameObserver {
    /// A frame boundary was reached; `frame` is the logical frame number.
    fn on_frame(&mut self, frame: u32);
}

impl<F: FnMut(u32)> FrameObserver for F {
    fn on_frame(&mut self, frame: u32) {
        self(frame);
    }
}
