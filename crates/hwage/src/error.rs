//! Error types for unwrapping.

use std::time::Duration;

use hwage_core::CoreError;
use hwage_device::KeyAlgorithm;
use thiserror::Error;

/// Errors that can surface from an unwrap.
///
/// Per-stanza mismatches never appear here; they are absorbed while scanning.
#[derive(Debug, Error)]
pub enum UnwrapError {
    /// No stanza was addressed to this identity. Another identity may succeed.
    #[error("no recipient stanza matched this identity")]
    NoMatch,

    /// A broken protocol invariant (derivation failure, bad file key length).
    #[error("protocol error: {0}")]
    Core(#[from] CoreError),

    /// The key handle does not support X25519 key agreement.
    #[error("unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(KeyAlgorithm),

    /// The unwrap did not finish before the deadline.
    #[error("unwrap timed out after {0:?}")]
    TimedOut(Duration),

    /// The blocking unwrap task panicked or was cancelled.
    #[error("unwrap task failed: {0}")]
    Task(String),
}

impl UnwrapError {
    /// Whether the caller should move on to another identity.
    pub fn is_no_match(&self) -> bool {
        matches!(self, UnwrapError::NoMatch)
    }
}

/// Result type for unwrap operations.
pub type Result<T> = std::result::Result<T, UnwrapError>;
