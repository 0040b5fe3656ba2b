//! Error type shared by the buffer, codec and analyzer modules

use thiserror::Error;

/// Errors surfaced by buffer operations and codec conversions
#[derive(Debug, Error)]
pub enum Error {
    /// An address or span falls outside the legal window for the operation
    #[error("address {address:#x} (length {length}) is outside the window {start:#x}..{end:#x}")]
    Range {
        address: usize,
        length: usize,
        start: usize,
        end: usize,
    },

    /// A value cannot be represented with the requested width or size
    #[error("{0}")]
    Validation(String),

    /// Unknown or unsupported encoding name
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Write requested on a buffer that was never bound to a file
    #[error("buffer is not bound to a file")]
    Unbound,

    /// Underlying filesystem failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
