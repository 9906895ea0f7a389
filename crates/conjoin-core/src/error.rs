//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur in the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value has no key encoding, or key bytes are malformed.
    #[error("encoding error: {0}")]
    Encoding(String),
}
