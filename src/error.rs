use std::io;

use thiserror::Error;

/// Errors that abort a metainfo build.
///
/// Any of these means no `.torrent` bytes were produced. Pieces and digests
/// computed before the failure are dropped with the build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A file could not be read at the requested range.
    #[error("failed to read {path} at offset {offset}: {source}")]
    Io {
        path: String,
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// No files were supplied, or the files hold zero bytes in total.
    #[error("no input data")]
    EmptyInput,

    /// The supplied or derived piece length is not positive.
    #[error("invalid piece length: {0}")]
    InvalidPieceLength(u64),

    /// A file in a multi-file set has no path below the root folder.
    #[error("file #{index} has no path below the root folder")]
    InvalidPath { index: usize },

    /// The digest backend failed or produced an incomplete digest set.
    #[error("piece hashing failed: {0}")]
    HashComputation(String),

    /// The build was cancelled between pieces.
    #[error("build cancelled")]
    Cancelled,
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;
