//! Command implementations.
//!
//! Each submodule handles one CLI subcommand.

mod analyze;
mod diff;
mod usage;

use std::path::Path;

use presid::Region;
use tracing::error;

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Diff { .. } => handle_diff(cli),
        Commands::Analyze { .. } => handle_analyze(cli),
        Commands::Usage { input } => usage::cmd_usage(input.as_deref()),
    }
}

fn handle_diff(cli: &Cli) -> i32 {
    let Commands::Diff {
        data,
        player,
        output,
        load_addr,
        skip_bytes,
        frames,
        flipflop_addr,
        frame_counter_addr,
        include_regions,
        ignore_sid_regs,
        overwrite,
        dump,
        exec,
        patch,
    } = &cli.command
    else {
        unreachable!("diff command variant mismatch");
    };
    let include_regions: Vec<Region> = include_regions
        .iter()
        .flat_map(|list| list.0.iter().copied())
        .collect();

    diff::cmd_diff(&diff::DiffArgs {
        data,
        player,
        output,
        load_addr: *load_addr,
        skip_bytes: *skip_bytes,
        frames: *frames,
        flipflop_addr: *flipflop_addr,
        frame_counter_addr: *frame_counter_addr,
        include_regions: &include_regions,
        ignore_sid_regs: *ignore_sid_regs,
        overwrite: *overwrite,
        dump: *dump,
        exec: exec.into(),
        synth: patch.into(),
        show_progress: !cli.silent,
    })
}

fn handle_analyze(cli: &Cli) -> i32 {
    let Commands::Analyze {
        input,
        clear,
        subtune,
        frames,
        print_memory,
        print_ranges,
        asm,
        check,
        exec,
        patch,
    } = &cli.command
    else {
        unreachable!("analyze command variant mismatch");
    };

    analyze::cmd_analyze(&analyze::AnalyzeArgs {
        input,
        clear: *clear,
        subtune: *subtune,
        frames: *frames,
        print_memory: *print_memory,
        print_ranges: *print_ranges,
        asm: *asm,
        check: *check,
        exec: exec.into(),
        synth: patch.into(),
        show_progress: !cli.silent,
    })
}

/// Read a whole input file, logging failures.
fn read_input(path: &Path, what: &str) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            error!(error = %e, path = %path.display(), "failed to read {what}");
            None
        }
    }
}
