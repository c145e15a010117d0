use std::io;

use thiserror::Error;

/// Errors reported by the checked MD5 operations.
///
/// The core algorithm is total; these only surface when a caller opts into
/// the checked API or hashes an I/O source.
#[derive(Debug, Error)]
pub enum Md5Error {
    /// The context already produced its digest and must be reset before reuse.
    #[error("MD5 context already finalized; call reset() before hashing a new message")]
    Finalized,

    /// Reading the input source failed.
    #[error("I/O error while reading input: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Md5Error>;
