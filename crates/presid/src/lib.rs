//! presid - pre-runs C64 music routines on an instrumented 6502
//!
//! Loads a player and its tune into a traced 64 KiB address space, runs it
//! for a number of frames, and reports which memory cells the run touched.
//! The final values of the touched cells can be encoded as a small 6502
//! routine that replays the changes without running the player.
//!
//! # Example
//!
//! ```ignore
//! use presid::{ExecConfig, Session, SynthConfig, CellState};
//!
//! let mut session = Session::new(ExecConfig::default());
//! session.load_sid(&presid::SidFile::parse(&std::fs::read("tune.sid")?)?);
//! session.call_init(0)?;
//! session.play_frames(50, &mut |_: u32| {})?;
//! let patch = session.synthesize(CellState::WRITTEN, &SynthConfig::default());
//! ```

// Re-export from sub-crates
pub use presid_cpu::{Bus, CpuCore, CpuError, FlatMemory, Mos6502, decode};
pub use presid_image::{
    ImageError, ImageKind, LoadedImage, SidFile, SidHeader, SidMagic, parse_prg, parse_raw,
};
pub use presid_patch::{
    IndexRegister, PatchInstr, PatchProgram, PatchStats, SynthConfig, synthesize,
};
pub use presid_state::{
    AddressSpace, CellState, Region, RegionError, RegionRun, SID_REGISTERS, STACK_PAGE_REGION,
    StateLabel, ZERO_PAGE, parse_address, parse_regions,
};

mod error;
pub mod exec;
pub mod metrics;
pub mod report;
mod session;
pub mod usage;

pub use error::{Error, Result};
pub use exec::{
    CallSummary, DEFAULT_MAX_STEPS, ExecConfig, ExecError, FrameObserver, FrameSetup, FrameSummary,
};
pub use session::{EntryPoints, PlaySummary, Session};
