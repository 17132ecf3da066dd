//! Error types for the hwage core protocol.

use thiserror::Error;

/// Errors that can occur while filtering, deriving, or unwrapping.
///
/// Only [`CoreError::Derivation`] and [`CoreError::FileKeyLength`] indicate a
/// broken protocol invariant; the remaining variants describe a stanza that is
/// simply not addressed to the local key.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The stanza arguments could not be decoded into an ephemeral key.
    #[error("malformed stanza: {0}")]
    MalformedStanza(String),

    /// HKDF could not produce the requested wrap key.
    #[error("key derivation failed: {0}")]
    Derivation(String),

    /// The stanza body failed AEAD authentication under the derived wrap key.
    #[error("stanza body failed authentication")]
    Authentication,

    /// The stanza body authenticated but did not contain a file key.
    #[error("invalid file key length: expected {expected}, got {actual}")]
    FileKeyLength { expected: usize, actual: usize },

    /// A recipient string or key could not be used.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Sealing a file key failed.
    #[error("encryption error: {0}")]
    Encryption(String),
}

impl CoreError {
    /// Whether this error marks a broken invariant rather than a stanza that
    /// belongs to someone else.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CoreError::Derivation(_) | CoreError::FileKeyLength { .. }
        )
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
