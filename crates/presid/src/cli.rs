//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use presid::{CellState, DEFAULT_MAX_STEPS, ExecConfig, IndexRegister, Region, SynthConfig};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when `--check` finds the region in use.
pub const EXIT_REGION_USED: i32 = 2;

/// Six minutes at 50 Hz.
const DEFAULT_ANALYZE_FRAMES: u32 = 6 * 60 * 50;

#[derive(Parser)]
#[command(name = "presid")]
#[command(about = "Pre-runs C64 music routines and writes compact replay patches")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Free-run a player over tune data and write a patch of the changed cells
    Diff {
        /// Raw tune data loaded at --load-addr
        #[arg(value_name = "DATA")]
        data: PathBuf,

        /// Player program (PRG); its load address is the entry point
        #[arg(short, long, value_name = "PRG")]
        player: PathBuf,

        /// Patch file to write
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Load address of the tune data
        #[arg(short, long, value_parser = parse_addr)]
        load_addr: u16,

        /// Leading bytes of the tune data to skip
        #[arg(long, default_value = "0", value_parser = parse_usize)]
        skip_bytes: usize,

        /// Stop once the player's frame counter reaches this value
        #[arg(short, long)]
        frames: u32,

        /// Cell the player toggles at every frame
        #[arg(long, value_parser = parse_addr)]
        flipflop_addr: u16,

        /// First of four cells holding the player's frame counter
        #[arg(long, value_parser = parse_addr)]
        frame_counter_addr: u16,

        /// Comma-separated addresses or ranges always included in the patch
        #[arg(short = 'g', long, value_name = "LIST", value_parser = parse_region_list)]
        include_regions: Vec<RegionList>,

        /// Also drop changes to the SID registers ($D400-$D7FF)
        #[arg(long)]
        ignore_sid_regs: bool,

        /// Replace an existing patch file
        #[arg(long)]
        overwrite: bool,

        /// Print a hex dump of memory after the run
        #[arg(long)]
        dump: bool,

        #[command(flatten)]
        exec: ExecArgs,

        #[command(flatten)]
        patch: PatchArgs,
    },
    /// Run a PSID tune's init and play routines and report memory usage
    Analyze {
        /// PSID/RSID file
        #[arg(value_name = "SID")]
        input: PathBuf,

        /// Forget instrumentation gathered while loading
        #[arg(short, long)]
        clear: bool,

        /// Subtune passed to init (default: the file's start song)
        #[arg(short = 't', long, value_parser = parse_u8)]
        subtune: Option<u8>,

        /// Number of play calls
        #[arg(short, long, default_value_t = DEFAULT_ANALYZE_FRAMES)]
        frames: u32,

        /// List every touched cell
        #[arg(short = 'm', long)]
        print_memory: bool,

        /// List merged ranges of cells matching MASK (read,written,init,all or 0-7)
        #[arg(long, value_name = "MASK", value_parser = parse_mask)]
        print_ranges: Option<CellState>,

        /// Print the patch listing for written cells
        #[arg(short, long)]
        asm: bool,

        /// Exit with status 2 if the tune touched this region
        #[arg(short = 'r', long, value_name = "RANGE", value_parser = parse_region)]
        check: Option<Region>,

        #[command(flatten)]
        exec: ExecArgs,

        #[command(flatten)]
        patch: PatchArgs,
    },
    /// Render a usage map from memory listings
    Usage {
        /// Listing file (default: stdin)
        #[arg(value_name = "LISTING")]
        input: Option<PathBuf>,
    },
}

/// Emulation limits.
#[derive(clap::Args, Clone, Debug)]
pub struct ExecArgs {
    /// Hard ceiling on executed instructions per run
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    pub max_steps: u64,

    /// Value every memory cell starts with
    #[arg(long, default_value = "0", value_parser = parse_u8)]
    pub fill: u8,
}

impl From<&ExecArgs> for ExecConfig {
    fn from(args: &ExecArgs) -> Self {
        Self::default()
            .with_max_steps(args.max_steps)
            .with_fill(args.fill)
    }
}

/// Patch encoding options.
#[derive(clap::Args, Clone, Debug)]
pub struct PatchArgs {
    /// Index register used by the patch
    #[arg(long, value_enum, default_value = "x")]
    pub register: RegisterArg,

    /// Assume the index register holds 0 when the patch is entered
    #[arg(long)]
    pub assume_zero_register: bool,
}

impl From<&PatchArgs> for SynthConfig {
    fn from(args: &PatchArgs) -> Self {
        Self::new()
            .with_register(args.register.into())
            .with_assume_zero_register(args.assume_zero_register)
    }
}

/// Index register argument.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum RegisterArg {
    #[default]
    X,
    Y,
}

impl From<RegisterArg> for IndexRegister {
    fn from(arg: RegisterArg) -> Self {
        match arg {
            RegisterArg::X => Self::X,
            RegisterArg::Y => Self::Y,
        }
    }
}

/// Regions named by one `--include-regions` value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionList(pub Vec<Region>);

// ============================================================================
// Value parsers
// ============================================================================

fn parse_addr(arg: &str) -> Result<u16, String> {
    presid::parse_address(arg).map_err(|e| e.to_string())
}

fn parse_u8(arg: &str) -> Result<u8, String> {
    let value = parse_addr(arg)?;
    u8::try_from(value).map_err(|_| format!("{arg} does not fit in a byte"))
}

fn parse_usize(arg: &str) -> Result<usize, String> {
    parse_addr(arg).map(usize::from)
}

fn parse_region(arg: &str) -> Result<Region, String> {
    arg.parse::<Region>().map_err(|e| e.to_string())
}

fn parse_region_list(arg: &str) -> Result<RegionList, String> {
    presid::parse_regions(arg)
        .map(RegionList)
        .map_err(|e| e.to_string())
}

/// Parse a state mask: flag names joined by `,` or `|`, or a number 0-7.
pub fn parse_mask(arg: &str) -> Result<CellState, String> {
    let mut mask = CellState::EMPTY;
    for token in arg.split([',', '|']).map(str::trim) {
        mask |= match token.to_ascii_lowercase().as_str() {
            "read" | "r" => CellState::READ,
            "written" | "write" | "w" => CellState::WRITTEN,
            "init" | "i" => CellState::INITIALIZED,
            "all" => CellState::ALL,
            _ => {
                let bits = parse_u8(token)?;
                if bits > CellState::ALL.bits() {
                    return Err(format!("mask {token} has bits outside 0-7"));
                }
                CellState::from_bits(bits)
            }
        };
    }
    if mask.is_empty() {
        return Err("mask selects no state".to_string());
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_mask() {
        assert_eq!(parse_mask("written").unwrap(), CellState::WRITTEN);
        assert_eq!(
            parse_mask("read,init").unwrap(),
            CellState::READ | CellState::INITIALIZED
        );
        assert_eq!(parse_mask("7").unwrap(), CellState::ALL);
        assert_eq!(
            parse_mask("0x2|r").unwrap(),
            CellState::READ | CellState::WRITTEN
        );
        assert!(parse_mask("8").is_err());
        assert!(parse_mask("0").is_err());
        assert!(parse_mask("bogus").is_err());
    }

    const DIFF_ARGS: [&str; 15] = [
        "presid",
        "diff",
        "tune.bin",
        "--player",
        "player.prg",
        "-o",
        "tune.patch",
        "--load-addr",
        "$1000",
        "--frames",
        "500",
        "--flipflop-addr",
        "0xF0",
        "--frame-counter-addr",
        "0xF4",
    ];

    fn parse_diff(extra: &[&str]) -> Commands {
        let args = DIFF_ARGS.iter().chain(extra);
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_diff_arguments() {
        let command = parse_diff(&[
            "--skip-bytes",
            "0x7E",
            "-g",
            "0x0400-0x0402,$D418",
            "--register",
            "y",
        ]);

        let Commands::Diff {
            load_addr,
            skip_bytes,
            include_regions,
            patch,
            exec,
            ..
        } = command
        else {
            panic!("expected diff");
        };
        assert_eq!(load_addr, 0x1000);
        assert_eq!(skip_bytes, 0x7E);
        let expected = vec![Region::new(0x0400, 0x0402), Region::single(0xD418)];
        assert_eq!(include_regions, [RegionList(expected)]);
        assert_eq!(SynthConfig::from(&patch).register, IndexRegister::Y);
        assert_eq!(exec.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn test_include_regions_trailing_comma() {
        let command = parse_diff(&["-g", "0x0400-0x0402,", "-g", "$D418"]);
        let Commands::Diff {
            include_regions,
            ..
        } = command
        else {
            panic!("expected diff");
        };
        let first = RegionList(vec![Region::new(0x0400, 0x0402)]);
        let second = RegionList(vec![Region::single(0xD418)]);
        assert_eq!(include_regions, [first, second]);

        let args = DIFF_ARGS.iter().chain(&["-g", ","]);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from([
            "presid",
            "-s",
            "analyze",
            "tune.sid",
            "--check",
            "$D400-$D7FF",
        ])
        .unwrap();
        assert!(cli.silent);
        let Commands::Analyze {
            frames,
            subtune,
            check,
            ..
        } = cli.command
        else {
            panic!("expected analyze");
        };
        assert_eq!(frames, DEFAULT_ANALYZE_FRAMES);
        assert_eq!(subtune, None);
        assert_eq!(check, Some(Region::new(0xD400, 0xD7FF)));
    }

    #[test]
    fn test_verbose_conflicts_with_silent() {
        let args = ["presid", "-v", "-s", "usage"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
