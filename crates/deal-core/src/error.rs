//! # Core Error Types
//!
//! Errors raised by the foundational types themselves. Domain crates
//! (registry, token, escrow) define their own error enums; this one only
//! covers construction and parsing of the primitives.

use thiserror::Error;

/// Errors from constructing or parsing core primitives.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A timestamp string failed validation.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An identifier string failed validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
