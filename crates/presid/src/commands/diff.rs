//! Diff command: free-run a player over raw tune data and save a patch.

use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use presid::metrics::{self, RunKind};
use presid::report::{save_patch, write_hex_dump};
use presid::{
    CellState, ExecConfig, FrameSetup, Region, Session, SynthConfig, parse_prg, parse_raw,
};
use tracing::{Level, debug, error, info};

use super::read_input;
use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal::{self, Progress};

#[allow(clippy::struct_excessive_bools)]
pub struct DiffArgs<'a> {
    pub data: &'a Path,
    pub player: &'a Path,
    pub output: &'a Path,
    pub load_addr: u16,
    pub skip_bytes: usize,
    pub frames: u32,
    pub flipflop_addr: u16,
    pub frame_counter_addr: u16,
    pub include_regions: &'a [Region],
    pub ignore_sid_regs: bool,
    pub overwrite: bool,
    pub dump: bool,
    pub exec: ExecConfig,
    pub synth: SynthConfig,
    pub show_progress: bool,
}

/// Handle the `diff` command.
pub fn cmd_diff(args: &DiffArgs<'_>) -> i32 {
    let Some(data) = read_input(args.data, "tune data") else {
        return EXIT_FAILURE;
    };
    let Some(player) = read_input(args.player, "player") else {
        return EXIT_FAILURE;
    };

    let data = match parse_raw(&data, args.load_addr, args.skip_bytes) {
        Ok(image) => image,
        Err(e) => {
            error!(error = %e, path = %args.data.display(), "invalid tune data");
            return EXIT_FAILURE;
        }
    };
    let player = match parse_prg(&player) {
        Ok(image) => image,
        Err(e) => {
            error!(error = %e, path = %args.player.display(), "invalid player program");
            return EXIT_FAILURE;
        }
    };
    info!(bytes = data.data.len(), "tune data loaded");
    info!(
        bytes = player.data.len(),
        entry = format_args!("{:#06x}", player.load_addr),
        "player loaded"
    );

    let mut session = Session::new(args.exec);
    session.load_image(&data, false);
    session.load_image(&player, false);

    let setup = FrameSetup {
        entry: player.load_addr,
        flipflop_addr: args.flipflop_addr,
        frame_counter_addr: args.frame_counter_addr,
        frames: args.frames,
    };

    let mut progress = Progress::new(args.frames, "Playing", args.show_progress);
    let started = Instant::now();
    let summary = match session.run_frames(&setup, &mut progress) {
        Ok(summary) => summary,
        Err(e) => {
            progress.finish();
            error!(error = %e, "player run failed");
            return EXIT_FAILURE;
        }
    };
    progress.finish();
    let elapsed = started.elapsed();
    metrics::record_run(RunKind::FreeRun, summary.steps, summary.frame, elapsed);

    session.ignore_defaults(args.ignore_sid_regs);
    session.force_include(args.include_regions);

    let changes = session.count_matching(CellState::WRITTEN);
    metrics::record_changed_cells(changes);
    if tracing::enabled!(Level::DEBUG) {
        let written = |state: CellState| state.contains(CellState::WRITTEN);
        for addr in session.space().changed(written) {
            debug!("{addr:#06x}: {:#04x}", session.space().peek(addr));
        }
    }
    println!("Total changes: {changes} places");

    if args.dump {
        let mut out = BufWriter::new(io::stdout().lock());
        let dumped = write_hex_dump(session.space(), &mut out);
        if let Err(e) = dumped.and_then(|()| out.flush()) {
            error!(error = %e, "failed to write memory dump");
            return EXIT_FAILURE;
        }
    }

    let program = session.synthesize(CellState::WRITTEN, &args.synth);
    let stats = program.stats();
    metrics::record_patch(&stats);

    if let Err(e) = save_patch(args.output, &program.to_bytes(), args.overwrite) {
        error!(error = %e, "failed to save patch");
        return EXIT_FAILURE;
    }

    if args.show_progress {
        terminal::success(&format!(
            "Patch written: {} bytes, {} stores, {} frames in {} steps",
            stats.bytes, stats.stores, summary.frame, summary.steps
        ));
        terminal::path_output(args.output);
    }
    EXIT_SUCCESS
}
