//! Serialized access to a single physical device.

use std::sync::Mutex;

use hwage_core::{SharedSecret, X25519PublicKey};

use crate::auth::KeyAuth;
use crate::error::{DeviceError, Result};
use crate::traits::Ecdh;

/// Wraps a device so that at most one ECDH request is in flight.
///
/// Identities sharing one token from several threads should share one
/// `Serialized` (usually behind an `Arc`).
pub struct Serialized<D> {
    public: X25519PublicKey,
    inner: Mutex<D>,
}

impl<D: Ecdh> Serialized<D> {
    /// Take ownership of a device.
    pub fn new(device: D) -> Self {
        Self {
            public: device.public_key(),
            inner: Mutex::new(device),
        }
    }

    /// Release the device.
    pub fn into_inner(self) -> Result<D> {
        self.inner
            .into_inner()
            .map_err(|_| DeviceError::new("device lock poisoned"))
    }
}

impl<D: Ecdh> Ecdh for Serialized<D> {
    fn public_key(&self) -> X25519PublicKey {
        self.public
    }

    fn ecdh(&self, auth: &KeyAuth, peer: &X25519PublicKey) -> Result<SharedSecret> {
        let device = self
            .inner
            .lock()
            .map_err(|_| DeviceError::new("device lock poisoned"))?;
        device.ecdh(auth, peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::software::SoftwareX25519;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Fails if two requests ever overlap.
    struct ExclusiveDevice {
        inner: SoftwareX25519,
        busy: AtomicBool,
        calls: AtomicUsize,
    }

    impl Ecdh for ExclusiveDevice {
        fn public_key(&self) -> X25519PublicKey {
            self.inner.public_key()
        }

        fn ecdh(&self, auth: &KeyAuth, peer: &X25519PublicKey) -> Result<SharedSecret> {
            if self.busy.swap(true, Ordering::AcqRel) {
                return Err(DeviceError::new("device busy"));
            }
            std::thread::sleep(Duration::from_millis(2));
            self.calls.fetch_add(1, Ordering::Relaxed);
            let result = self.inner.ecdh(auth, peer);
            self.busy.store(false, Ordering::Release);
            result
        }
    }

    #[test]
    fn test_concurrent_requests_do_not_overlap() {
        let device = Arc::new(Serialized::new(ExclusiveDevice {
            inner: SoftwareX25519::generate(),
            busy: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }));
        let peer = SoftwareX25519::generate().public_key();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let device = Arc::clone(&device);
                scope.spawn(move || {
                    for _ in 0..5 {
                        device.ecdh(&KeyAuth::none(), &peer).unwrap();
                    }
                });
            }
        });

        let inner = Arc::try_unwrap(device)
            .ok()
            .unwrap()
            .into_inner()
            .unwrap();
        assert_eq!(inner.calls.load(Ordering::Relaxed), 20);
    }

    #[test]
    fn test_public_key_passthrough() {
        let software = SoftwareX25519::generate();
        let public = software.public_key();

        assert_eq!(Serialized::new(software).public_key(), public);
    }
}
