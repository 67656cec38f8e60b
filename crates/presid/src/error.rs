use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the analysis pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("image error: {0}")]
    Image(#[from] presid_image::ImageError),
    #[error("invalid region: {0}")]
    Region(#[from] presid_state::RegionError),
    #[error("execution failed: {0}")]
    Exec(#[from] crate::exec::ExecError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("refusing to overwrite existing patch file {}", .0.display())]
    PatchExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
