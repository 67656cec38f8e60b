//! Instrumented address space for tracing what a 6502 routine touches.
//!
//! [`AddressSpace`] holds 65536 cells, each with a value, a [`CellState`] flag
//! set and an access counter. The CPU core only reaches memory through
//! [`InstrumentedBus`], so every instruction fetch, operand read, stack
//! operation and store leaves a trace.
//!
//! Region operations ([`AddressSpace::ignore`], [`AddressSpace::force_include`],
//! [`AddressSpace::merge_to_ranges`]) refine the traced set before it is
//! reported or turned into a patch program.
//!
//! ```
//! use presid_cpu::{CpuCore, Mos6502};
//! use presid_state::{AddressSpace, CellState};
//!
//! let mut space = AddressSpace::new(0);
//! // STX $0400
//! space.load_bytes(0x1000, &[0x8E, 0x00, 0x04], false);
//!
//! let mut cpu = Mos6502::new();
//! cpu.set_pc(0x1000);
//! cpu.step(&mut space.bus()).unwrap();
//!
//! assert!(space.state(0x0400).contains(CellState::WRITTEN));
//! assert_eq!(space.access_count(0x0400), 1);
//! ```

mod bus;
mod parse;
mod region;
mod space;

pub use bus::InstrumentedBus;
pub use parse::{parse_address, parse_regions};
pub use region::{Region, RegionRun, SID_REGISTERS, STACK_PAGE_REGION, ZERO_PAGE};
pub use space::{AddressSpace, CellState, StateLabel};

use thiserror::Error;

/// Region specification errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("empty region specification")]
    Empty,

    #[error("invalid address literal '{0}'")]
    InvalidAddress(String),

    #[error("address {value:#x} out of range in '{token}'")]
    OutOfRange { token: String, value: u64 },
}

pub type Result<T> = std::result::Result<T, RegionError>;
