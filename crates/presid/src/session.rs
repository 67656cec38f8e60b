//! Analysis session: one address space, one CPU core, one set of entry points.

use presid_cpu::{CpuCore, Mos6502};
use presid_image::{LoadedImage, SidFile};
use presid_patch::{PatchProgram, SynthConfig, synthesize};
use presid_state::{AddressSpace, CellState, Region, SID_REGISTERS, STACK_PAGE_REGION, ZERO_PAGE};
use tracing::{debug, info, warn};

use crate::exec::{
    self, CallSummary, ExecConfig, ExecError, FrameObserver, FrameSetup, FrameSummary,
};

/// Init/play routine addresses of a loaded tune.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryPoints {
    pub init: Option<u16>,
    pub play: Option<u16>,
}

impl EntryPoints {
    /// Zero addresses mean "not provided".
    #[must_use]
    pub fn new(init: u16, play: u16) -> Self {
        Self {
            init: (init != 0).then_some(init),
            play: (play != 0).then_some(play),
        }
    }
}

/// Totals for a batch of play calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaySummary {
    pub frames: u32,
    pub steps: u64,
    pub unbalanced_calls: u32,
}

/// Owns the instrumented memory and the CPU core for one analysis run.
pub struct Session<C: CpuCore = Mos6502> {
    space: AddressSpace,
    cpu: C,
    config: ExecConfig,
    entry: EntryPoints,
    steps: u64,
}

impl Session<Mos6502> {
    /// Create a session with a fresh 6502 core.
    #[must_use]
    pub fn new(config: ExecConfig) -> Self {
        Self::with_cpu(Mos6502::new(), config)
    }
}

impl<C: CpuCore> Session<C> {
    /// Create a session around an existing core.
    #[must_use]
    pub fn with_cpu(cpu: C, config: ExecConfig) -> Self {
        Self {
            space: AddressSpace::new(config.fill),
            cpu,
            config,
            entry: EntryPoints::default(),
            steps: 0,
        }
    }

    #[must_use]
    pub const fn space(&self) -> &AddressSpace {
        &self.space
    }

    pub const fn space_mut(&mut self) -> &mut AddressSpace {
        &mut self.space
    }

    #[must_use]
    pub const fn cpu(&self) -> &C {
        &self.cpu
    }

    #[must_use]
    pub const fn config(&self) -> &ExecConfig {
        &self.config
    }

    #[must_use]
    pub const fn entry_points(&self) -> EntryPoints {
        self.entry
    }

    pub const fn set_entry_points(&mut self, entry: EntryPoints) {
        self.entry = entry;
    }

    /// Instructions executed so far across all runs.
    #[must_use]
    pub const fn total_steps(&self) -> u64 {
        self.steps
    }

    /// Refill memory with the configured fill value and clear instrumentation.
    pub fn reset(&mut self) {
        self.space.reset(self.config.fill);
        self.steps = 0;
    }

    /// Forget all instrumentation, keeping memory contents.
    pub fn clear_tracking(&mut self) {
        debug!("clearing memory tracking");
        self.space.clear_tracking();
    }

    /// Copy an image into memory.
    pub fn load_image(&mut self, image: &LoadedImage, mark_initialized: bool) {
        image.load_into(&mut self.space, mark_initialized);
    }

    /// Load a SID tune, flagging its bytes as initialized, and adopt its
    /// init/play addresses.
    pub fn load_sid(&mut self, sid: &SidFile) {
        self.load_image(&sid.image, true);
        self.entry = EntryPoints::new(sid.header.init_addr, sid.header.play_addr);
        info!(
            name = %sid.header.name,
            load = format_args!("{:#06x}", sid.image.load_addr),
            init = format_args!("{:#06x}", sid.header.init_addr),
            play = format_args!("{:#06x}", sid.header.play_addr),
            "loaded SID"
        );
    }

    /// Emulated subroutine call of `entry` with `accumulator` in A.
    ///
    /// # Errors
    ///
    /// Propagates step-ceiling exhaustion and CPU faults.
    pub fn call(&mut self, entry: u16, accumulator: u8) -> exec::Result<CallSummary> {
        let summary = exec::run_until_return(
            &mut self.cpu,
            &mut self.space,
            entry,
            accumulator,
            self.config.max_steps,
        )?;
        self.steps += summary.steps;
        Ok(summary)
    }

    /// Run the init routine for `subtune`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::MissingEntryPoint`] if no init address is known.
    pub fn call_init(&mut self, subtune: u8) -> exec::Result<CallSummary> {
        let init = self.entry.init.ok_or(ExecError::MissingEntryPoint("init"))?;
        let summary = self.call(init, subtune)?;
        if !summary.balanced {
            warn!(
                init = format_args!("{init:#06x}"),
                "init routine left the sentinel stack cells unbalanced"
            );
        }
        info!(subtune, steps = summary.steps, "init complete");
        Ok(summary)
    }

    /// Call the play routine `frames` times, then drop the stack page from
    /// the traced set.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::MissingEntryPoint`] if init or play address is
    /// unknown; propagates execution failures.
    pub fn play_frames<O>(&mut self, frames: u32, observer: &mut O) -> exec::Result<PlaySummary>
    where
        O: FrameObserver + ?Sized,
    {
        if self.entry.init.is_none() {
            return Err(ExecError::MissingEntryPoint("init"));
        }
        let play = self.entry.play.ok_or(ExecError::MissingEntryPoint("play"))?;

        let mut summary = PlaySummary::default();
        for frame in 1..=frames {
            let call = self.call(play, 0)?;
            summary.frames = frame;
            summary.steps += call.steps;
            if !call.balanced {
                summary.unbalanced_calls += 1;
            }
            observer.on_frame(frame);
            if self.config.is_progress_frame(frame) {
                debug!(frame, steps = summary.steps, "play progress");
            }
        }

        self.space.ignore(STACK_PAGE_REGION);

        if summary.unbalanced_calls > 0 {
            warn!(
                calls = summary.unbalanced_calls,
                "play routine left the sentinel stack cells unbalanced"
            );
        }
        info!(
            frames = summary.frames,
            steps = summary.steps,
            "playback complete"
        );
        Ok(summary)
    }

    /// Free-run the player until its frame counter reaches the target.
    ///
    /// # Errors
    ///
    /// Propagates step-ceiling exhaustion and CPU faults.
    pub fn run_frames<O>(
        &mut self,
        setup: &FrameSetup,
        observer: &mut O,
    ) -> exec::Result<FrameSummary>
    where
        O: FrameObserver + ?Sized,
    {
        let summary = exec::run_frames(
            &mut self.cpu,
            &mut self.space,
            setup,
            &self.config,
            observer,
        )?;
        self.steps += summary.steps;
        Ok(summary)
    }

    /// Drop zero page, stack page and optionally the SID registers.
    pub fn ignore_defaults(&mut self, ignore_sid_registers: bool) {
        self.space.ignore(ZERO_PAGE);
        self.space.ignore(STACK_PAGE_REGION);
        if ignore_sid_registers {
            self.space.ignore(SID_REGISTERS);
        }
    }

    pub fn force_include(&mut self, regions: &[Region]) {
        for &region in regions {
            self.space.force_include(region);
        }
    }

    /// Number of cells whose state intersects `mask`.
    #[must_use]
    pub fn count_matching(&self, mask: CellState) -> usize {
        self.space
            .changed(move |state| state.intersects(mask))
            .count()
    }

    /// Encode every cell whose state intersects `mask` as a patch program.
    #[must_use]
    pub fn synthesize(&self, mask: CellState, config: &SynthConfig) -> PatchProgram {
        synthesize(&self.space, move |state| state.intersects(mask), config)
    }
}
