//! Analyze command: run a PSID tune and report its memory usage.

use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use presid::metrics::{self, RunKind};
use presid::report::{write_memory_listing, write_patch_listing, write_ranges};
use presid::{CellState, ExecConfig, Region, Session, SidFile, SynthConfig};
use tracing::{error, info};

use super::read_input;
use crate::cli::{EXIT_FAILURE, EXIT_REGION_USED, EXIT_SUCCESS};
use crate::terminal::{self, Progress, Spinner};

#[allow(clippy::struct_excessive_bools)]
pub struct AnalyzeArgs<'a> {
    pub input: &'a Path,
    pub clear: bool,
    pub subtune: Option<u8>,
    pub frames: u32,
    pub print_memory: bool,
    pub print_ranges: Option<CellState>,
    pub asm: bool,
    pub check: Option<Region>,
    pub exec: ExecConfig,
    pub synth: SynthConfig,
    pub show_progress: bool,
}

/// Handle the `analyze` command.
pub fn cmd_analyze(args: &AnalyzeArgs<'_>) -> i32 {
    let Some(bytes) = read_input(args.input, "SID file") else {
        return EXIT_FAILURE;
    };
    let sid = match SidFile::parse(&bytes) {
        Ok(sid) => sid,
        Err(e) => {
            error!(error = %e, path = %args.input.display(), "invalid SID file");
            return EXIT_FAILURE;
        }
    };

    let mut session = Session::new(args.exec);
    session.load_sid(&sid);
    if args.clear {
        session.clear_tracking();
    }

    // Songs are numbered from 1 in the header, from 0 in the accumulator.
    let start_song = sid.header.start_song.saturating_sub(1);
    let default_subtune = u8::try_from(start_song).unwrap_or(0);
    let subtune = args.subtune.unwrap_or(default_subtune);

    let message = format!("Running init for subtune {subtune}");
    let spinner = Spinner::new(message, args.show_progress);
    let started = Instant::now();
    let init = match session.call_init(subtune) {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, subtune, "init failed");
            return EXIT_FAILURE;
        }
    };
    metrics::record_run(RunKind::Init, init.steps, 0, started.elapsed());
    metrics::record_unbalanced_calls(RunKind::Init, u32::from(!init.balanced));
    spinner.finish_with_success(&format!("Init returned after {} steps", init.steps));

    let mut progress = Progress::new(args.frames, "Playing", args.show_progress);
    let started = Instant::now();
    let play = match session.play_frames(args.frames, &mut progress) {
        Ok(summary) => summary,
        Err(e) => {
            progress.finish();
            error!(error = %e, "play failed");
            return EXIT_FAILURE;
        }
    };
    progress.finish();
    metrics::record_run(RunKind::Play, play.steps, play.frames, started.elapsed());
    metrics::record_unbalanced_calls(RunKind::Play, play.unbalanced_calls);
    metrics::record_changed_cells(session.count_matching(CellState::ALL));

    if let Err(e) = write_reports(&session, args) {
        error!(error = %e, "failed to write report");
        return EXIT_FAILURE;
    }

    if let Some(region) = args.check {
        if session.space().is_used(region) {
            terminal::error(&format!("Region {region} used by tune!"));
            return EXIT_REGION_USED;
        }
        info!(%region, "region untouched");
    }

    EXIT_SUCCESS
}

fn write_reports(session: &Session, args: &AnalyzeArgs<'_>) -> io::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());

    if args.print_memory {
        write_memory_listing(session.space(), CellState::ALL, &mut out)?;
    }
    if let Some(mask) = args.print_ranges {
        write_ranges(session.space(), mask, &mut out)?;
    }
    if args.asm {
        let program = session.synthesize(CellState::WRITTEN, &args.synth);
        metrics::record_patch(&program.stats());
        write_patch_listing(&program, &mut out)?;
    }

    out.flush()
}
