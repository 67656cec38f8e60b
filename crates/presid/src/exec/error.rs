//! Execution controller errors.

use presid_cpu::CpuError;
use thiserror::Error;

/// Execution controller error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("sanity counter exhausted after {steps} steps")]
    SanityExhausted { steps: u64 },

    #[error("CPU fault: {0}")]
    Cpu(#[from] CpuError),

    #[error("no {0} address known: load a program first")]
    MissingEntryPoint(&'static str),
}
