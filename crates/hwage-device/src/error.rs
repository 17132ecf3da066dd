//! Error type for ECDH capabilities.

use thiserror::Error;

/// A failure reported by the holder of the private key.
///
/// Covers wrong authorization, a missing or busy device, and anything else
/// the hardware can report. The cause is human-readable and never contains
/// key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("device error: {message}")]
pub struct DeviceError {
    message: String,
}

impl DeviceError {
    /// Create a device error with a human-readable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The human-readable cause.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for device operations.
pub type Result<T> = std::result::Result<T, DeviceError>;
