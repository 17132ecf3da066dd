//! Unwrap configuration.

use serde::{Deserialize, Serialize};

/// Configuration for an [`crate::Identity`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnwrapConfig {
    /// Upper bound on ECDH requests per unwrap. Each request may cost a PIN
    /// check or a touch. `None` means every candidate is tried.
    pub max_device_attempts: Option<usize>,
    /// Emit a debug event for every rejected stanza.
    pub log_rejections: bool,
}

impl UnwrapConfig {
    /// Limit the number of ECDH requests per unwrap.
    pub fn max_device_attempts(mut self, limit: usize) -> Self {
        self.max_device_attempts = Some(limit);
        self
    }

    /// Log every rejected stanza at debug level.
    pub fn log_rejections(mut self, enabled: bool) -> Self {
        self.log_rejections = enabled;
        self
    }
}
