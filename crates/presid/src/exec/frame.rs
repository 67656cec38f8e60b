//! Frame-driven free-run mode.

use presid_cpu::CpuCore;
use presid_state::AddressSpace;
use tracing::{debug, info};

use super::{ExecConfig, ExecError, FrameObserver, Result};

/// Where the player publishes frame progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSetup {
    /// Player entry point.
    pub entry: u16,
    /// Cell whose every change marks a frame boundary.
    pub flipflop_addr: u16,
    /// First of four cells holding the little-endian frame number.
    pub frame_counter_addr: u16,
    /// Stop once the frame number reaches this value.
    pub frames: u32,
}

/// Outcome of a completed free run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    pub steps: u64,
    pub frame: u32,
    /// Number of flip-flop changes observed.
    pub boundaries: u64,
}

/// Reset `cpu`, start it at `setup.entry` and step until the frame counter
/// reaches `setup.frames`.
///
/// Flip-flop and frame counter polls bypass instrumentation. Any change of the
/// flip-flop cell counts as a boundary, so a routine toggling it several times
/// per logical frame still advances only as far as its counter says.
///
/// # Errors
///
/// Returns [`ExecError::SanityExhausted`] once `config.max_steps` instructions
/// ran without reaching the target, or [`ExecError::Cpu`] on a CPU fault.
pub fn run_frames<C, O>(
    cpu: &mut C,
    space: &mut AddressSpace,
    setup: &FrameSetup,
    config: &ExecConfig,
    observer: &mut O,
) -> Result<FrameSummary>
where
    C: CpuCore,
    O: FrameObserver + ?Sized,
{
    cpu.reset(&mut space.bus());
    cpu.set_pc(setup.entry);

    let mut flipflop = space.peek(setup.flipflop_addr);
    let mut summary = FrameSummary::default();

    debug!(
        entry = format_args!("{:#06x}", setup.entry),
        target = setup.frames,
        "starting free run"
    );

    while summary.frame < setup.frames {
        if summary.steps >= config.max_steps {
            return Err(ExecError::SanityExhausted {
                steps: summary.steps,
            });
        }

        cpu.step(&mut space.bus())?;
        summary.steps += 1;

        let current = space.peek(setup.flipflop_addr);
        if current != flipflop {
            flipflop = current;
            summary.boundaries += 1;
            summary.frame = space.peek_u32(setup.frame_counter_addr);
            observer.on_frame(summary.frame);
            if config.is_progress_frame(summary.frame) {
                debug!(
                    frame = summary.frame,
                    steps = summary.steps,
                    "frame progress"
                );
            }
        }
    }

    info!(
        frames = summary.frame,
        steps = summary.steps,
        boundaries = summary.boundaries,
        "free run complete"
    );
    Ok(summary)
}
