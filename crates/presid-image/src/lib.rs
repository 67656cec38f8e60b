//! Image parsers for C64 music files and player binaries.

mod constants;
mod image;
mod prg;
mod raw;
mod sid;

pub use constants::*;
pub use image::*;
pub use prg::parse_prg;
pub use raw::parse_raw;
pub use sid::{SidFile, SidHeader, SidMagic};

use thiserror::Error;

/// Image parsing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("image too small: {len} bytes, need at least {need}")]
    TooSmall { len: usize, need: usize },
    #[error("invalid SID magic {0:?}")]
    InvalidMagic([u8; 4]),
    #[error("SID data offset {offset:#x} beyond file of {len} bytes")]
    DataOffsetOutOfBounds { offset: usize, len: usize },
    #[error("skip of {skip} bytes beyond file of {len} bytes")]
    SkipBeyondFile { skip: usize, len: usize },
    #[error("{len} bytes at {load_addr:#06x} do not fit below $FFFF")]
    DoesNotFit { load_addr: u16, len: usize },
}

pub type Result<T> = std::result::Result<T, ImageError>;

/// Read a big-endian u16.
#[inline]
fn read_be16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

/// Read a little-endian u16.
#[inline]
fn read_le16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}
