use std::path::PathBuf;

use crate::contract::StoreError;

/// Errors surfaced by the bucket manager.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The sync root is missing or is not a directory.
    #[error("invalid sync root {}: {reason}", .path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    /// The sync root could not be listed.
    #[error("failed to read directory {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
