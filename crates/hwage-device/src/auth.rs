//! Authorization material handed to the device with every request.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// When the device asks for the PIN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinPolicy {
    /// Never.
    #[default]
    Never,
    /// Once per session.
    Once,
    /// On every private-key operation.
    Always,
}

/// When the device asks for a physical touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPolicy {
    /// Never.
    #[default]
    Never,
    /// On every private-key operation.
    Always,
    /// At most once every few seconds.
    Cached,
}

/// A device PIN. Wiped on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Pin(String);

impl Pin {
    /// Wrap a PIN.
    pub fn new(pin: impl Into<String>) -> Self {
        Self(pin.into())
    }

    /// Reveal the PIN to the device transport.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Pin {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Pin {}

impl From<&str> for Pin {
    fn from(pin: &str) -> Self {
        Self::new(pin)
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(..)")
    }
}

/// PIN and policies for one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyAuth {
    /// PIN to present if the device asks for one.
    pub pin: Option<Pin>,
    /// PIN policy the key was generated with.
    pub pin_policy: PinPolicy,
    /// Touch policy the key was generated with.
    pub touch_policy: TouchPolicy,
}

impl KeyAuth {
    /// No PIN, no touch.
    pub fn none() -> Self {
        Self::default()
    }

    /// Present `pin` whenever the device asks.
    pub fn with_pin(pin: impl Into<Pin>) -> Self {
        Self {
            pin: Some(pin.into()),
            pin_policy: PinPolicy::Once,
            touch_policy: TouchPolicy::Never,
        }
    }

    /// Set the touch policy.
    pub fn touch_policy(mut self, policy: TouchPolicy) -> Self {
        self.touch_policy = policy;
        self
    }

    /// Set the PIN policy.
    pub fn pin_policy(mut self, policy: PinPolicy) -> Self {
        self.pin_policy = policy;
        self
    }
}
