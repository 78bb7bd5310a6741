//! Error types for the two halves of the codec.
//!
//! Kept as two separate enums rather than one shared error: the failure
//! modes of encoding (running out of output capacity) and decoding
//! (malformed input) don't overlap, and a caller handling one never needs to
//! match on variants that belong to the other.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressError {
    #[error("ndlz8 only supports 2 dimensions, got {0}")]
    InvalidNdim(u8),

    #[error("leftover blocks are not supported by this codec")]
    UnsupportedLeftover,

    #[error("input length {got} does not match rows*cols ({expected})")]
    LengthMismatch { expected: usize, got: usize },

    #[error("output buffer of {got} bytes is smaller than the {expected} bytes this block shape requires at minimum")]
    OutputTooSmall { expected: usize, got: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressError {
    #[error("ndlz8 only supports 2 dimensions, got {0}")]
    InvalidNdim(u8),

    #[error("input ended before a complete token or its payload could be read")]
    Truncated,

    #[error("cell token {0:#04x} does not correspond to any known match class")]
    BadToken(u8),

    #[error("a back-reference pointed outside of the bytes produced so far")]
    InvalidBackReference,

    #[error("input has trailing bytes after the last cell's token stream")]
    SizeMismatch,

    #[error("output buffer of {got} bytes is smaller than the {expected} bytes rows*cols requires")]
    OutputTooSmall { expected: usize, got: usize },
}
