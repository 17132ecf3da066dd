//! A software X25519 key that behaves like a token slot.
//!
//! Useful for tests and for identities whose secret lives on disk. It
//! enforces a PIN the same way a token would, but has no touch sensor.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::RngCore;
use x25519_dalek::{PublicKey, StaticSecret};

use hwage_core::{SharedSecret, X25519PublicKey};

use crate::auth::{KeyAuth, Pin, PinPolicy};
use crate::error::{DeviceError, Result};
use crate::traits::Ecdh;

/// An in-memory X25519 private key.
pub struct SoftwareX25519 {
    secret: StaticSecret,
    public: X25519PublicKey,
    pin: Option<Pin>,
    pin_policy: PinPolicy,
    pin_verified: AtomicBool,
}

impl SoftwareX25519 {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    /// Create from secret scalar bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = X25519PublicKey::from(PublicKey::from(&secret));
        Self {
            secret,
            public,
            pin: None,
            pin_policy: PinPolicy::Never,
            pin_verified: AtomicBool::new(false),
        }
    }

    /// Require `pin` according to `policy`.
    pub fn with_pin(mut self, pin: impl Into<Pin>, policy: PinPolicy) -> Self {
        self.pin = Some(pin.into());
        self.pin_policy = policy;
        self
    }

    fn verify_pin(&self, auth: &KeyAuth) -> Result<()> {
        let Some(expected) = &self.pin else {
            return Ok(());
        };

        match self.pin_policy {
            PinPolicy::Never => return Ok(()),
            PinPolicy::Once if self.pin_verified.load(Ordering::Acquire) => return Ok(()),
            PinPolicy::Once | PinPolicy::Always => {}
        }

        match &auth.pin {
            None => Err(DeviceError::new("PIN required")),
            Some(pin) if pin == expected => {
                self.pin_verified.store(true, Ordering::Release);
                Ok(())
            }
            Some(_) => {
                tracing::debug!("software key rejected PIN");
                Err(DeviceError::new("incorrect PIN"))
            }
        }
    }
}

impl Ecdh for SoftwareX25519 {
    fn public_key(&self) -> X25519PublicKey {
        self.public
    }

    fn ecdh(&self, auth: &KeyAuth, peer: &X25519PublicKey) -> Result<SharedSecret> {
        self.verify_pin(auth)?;
        Ok(SharedSecret::from(self.secret.diffie_hellman(&peer.to_dalek())))
    }
}
