//! Per-ticket scratch directories and archive handling.

mod archive;
mod temp;

pub use archive::unpack_if_archive;
pub use temp::{check_directory_writable, TempWorkspace};

use thiserror::Error;

/// Error type for workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to unpack archive: {0}")]
    Archive(String),
}
