//! # Error Types
//!
//! Errors raised when building fixed-width values from untrusted input.

use thiserror::Error;

/// Errors that can occur when parsing a fixed-width value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input did not have the required byte width.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Input was not valid hexadecimal.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}
