//! Error type shared by every codec and serializer in this crate.

use std::io;

/// Errors produced while encoding or decoding a value.
///
/// Logging never produces an error; only the binary directions do.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A decode asked for more bytes than the stream could provide.
    #[error(
        "stream truncated: needed {needed} bytes but only {available} were \
         available"
    )]
    Truncated {
        /// Number of bytes the decoder asked for.
        needed: usize,
        /// Number of bytes the stream actually produced.
        available: usize,
    },

    /// The underlying stream reported a failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A container is too long to be described by its length prefix.
    #[error("length {len} does not fit in a prefix with maximum {max}")]
    LengthOverflow {
        /// Length of the container being encoded.
        len: usize,
        /// Largest length the prefix can hold.
        max: usize,
    },

    /// A length-prefixed fixed-size array stored an unexpected count.
    #[error("length mismatch: expected {expected} elements, found {found}")]
    LengthMismatch {
        /// Number of elements the destination holds.
        expected: usize,
        /// Number of elements recorded in the stream.
        found: usize,
    },

    /// The bytes read cannot represent a value of the requested type.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Creates an [`Error::InvalidData`] from anything displayable.
    #[must_use]
    pub fn invalid_data(message: impl std::fmt::Display) -> Self {
        Self::InvalidData(message.to_string())
    }

    /// Returns `true` if the error is a [`Error::Truncated`].
    #[must_use]
    pub const fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
