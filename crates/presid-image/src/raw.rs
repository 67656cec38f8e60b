//! Headerless binaries placed at a caller-chosen address.

use crate::{ImageError, ImageKind, LoadedImage, Result};

/// Take `data` after its first `skip` bytes and place it at `load_addr`.
///
/// # Errors
///
/// Returns an error if `skip` exceeds the file or the remaining data does
/// not fit below `$FFFF`.
pub fn parse_raw(data: &[u8], load_addr: u16, skip: usize) -> Result<LoadedImage> {
    let payload = data.get(skip..).ok_or(ImageError::SkipBeyondFile {
        skip,
        len: data.len(),
    })?;
    LoadedImage::new(ImageKind::Raw, load_addr, payload.to_vec())
}
