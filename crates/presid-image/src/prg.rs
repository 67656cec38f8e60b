//! C64 PRG files: two-byte load address followed by data.

use crate::{ImageError, ImageKind, LoadedImage, PRG_HEADER_LEN, Result, read_le16};

/// Parse a PRG file. The load address doubles as the entry point.
///
/// # Errors
///
/// Returns an error if the file is shorter than its header or the data
/// does not fit below `$FFFF`.
pub fn parse_prg(data: &[u8]) -> Result<LoadedImage> {
    if data.len() < PRG_HEADER_LEN {
        return Err(ImageError::TooSmall {
            len: data.len(),
            need: PRG_HEADER_LEN,
        });
    }
    let load_addr = read_le16(data, 0);
    LoadedImage::new(ImageKind::Prg, load_addr, data[PRG_HEADER_LEN..].to_vec())
}
