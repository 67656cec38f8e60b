//! Parsed image ready for loading into an address space.

use presid_state::AddressSpace;
use tracing::debug;

use crate::{ImageError, Result};

/// Where an image came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Sid,
    Prg,
    Raw,
}

/// Contiguous bytes destined for `load_addr`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedImage {
    pub kind: ImageKind,
    pub load_addr: u16,
    pub data: Vec<u8>,
}

impl LoadedImage {
    /// Build an image, rejecting data that would run past `$FFFF`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::DoesNotFit`] if the data overflows the address space.
    pub fn new(kind: ImageKind, load_addr: u16, data: Vec<u8>) -> Result<Self> {
        if usize::from(load_addr) + data.len() > 0x1_0000 {
            return Err(ImageError::DoesNotFit {
                load_addr,
                len: data.len(),
            });
        }
        Ok(Self {
            kind,
            load_addr,
            data,
        })
    }

    /// Copy the image into `space`, flagging the bytes as initialized
    /// when `mark_initialized` is set.
    pub fn load_into(&self, space: &mut AddressSpace, mark_initialized: bool) {
        debug!(
            kind = ?self.kind,
            load_addr = format_args!("{:#06x}", self.load_addr),
            len = self.data.len(),
            "loading image"
        );
        space.load_bytes(self.load_addr, &self.data, mark_initialized);
    }
}
