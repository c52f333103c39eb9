//! Error types for addon-resolve

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] addon_fs::Error),

    #[error("Invalid Plug'n'Play data at {path}: {message}")]
    PnpData { path: PathBuf, message: String },
}
