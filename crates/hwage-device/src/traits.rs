//! The ECDH capability: the only thing an identity needs from its key holder.
//!
//! Implementations wrap a hardware token, a remote signer, or (for tests and
//! software identities) an in-memory secret. Calls may block for as long as
//! the holder needs, e.g. while waiting for a touch.

use std::sync::Arc;

use hwage_core::{SharedSecret, X25519PublicKey};

use crate::auth::KeyAuth;
use crate::error::Result;

/// A holder of an X25519 private key that can perform key agreement.
///
/// # Design Notes
///
/// - **One operation**: `ecdh` returns the raw shared secret or a
///   [`crate::DeviceError`]. Callers decide what a failure means.
/// - **No concurrency guarantees**: a device that cannot serve overlapping
///   requests must serialize them itself (see [`crate::Serialized`]).
pub trait Ecdh {
    /// The public half of the held key.
    fn public_key(&self) -> X25519PublicKey;

    /// Agree on a shared secret with `peer`, presenting `auth` if needed.
    fn ecdh(&self, auth: &KeyAuth, peer: &X25519PublicKey) -> Result<SharedSecret>;
}

impl<T: Ecdh + ?Sized> Ecdh for &T {
    fn public_key(&self) -> X25519PublicKey {
        (**self).public_key()
    }

    fn ecdh(&self, auth: &KeyAuth, peer: &X25519PublicKey) -> Result<SharedSecret> {
        (**self).ecdh(auth, peer)
    }
}

impl<T: Ecdh + ?Sized> Ecdh for Arc<T> {
    fn public_key(&self) -> X25519PublicKey {
        (**self).public_key()
    }

    fn ecdh(&self, auth: &KeyAuth, peer: &X25519PublicKey) -> Result<SharedSecret> {
        (**self).ecdh(auth, peer)
    }
}
