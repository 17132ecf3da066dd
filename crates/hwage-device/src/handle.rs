//! Key handles tagged by algorithm.
//!
//! A token slot can hold keys of several algorithms. Only the X25519 variant
//! carries an ECDH capability; the others exist so callers can report what
//! they found instead of guessing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::traits::Ecdh;

/// Key algorithms a token slot may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    /// X25519 key agreement.
    X25519,
    /// ECDSA / ECDH over NIST P-256.
    EccP256,
    /// Ed25519 signatures.
    Ed25519,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyAlgorithm::X25519 => "X25519",
            KeyAlgorithm::EccP256 => "ECC P-256",
            KeyAlgorithm::Ed25519 => "Ed25519",
        };
        f.write_str(name)
    }
}

/// A borrowed handle to a private key.
pub enum KeyHandle<'a> {
    /// An X25519 key with its ECDH capability.
    X25519(&'a dyn Ecdh),
    /// A P-256 key, identified by its SEC1-encoded public key.
    EccP256 {
        /// SEC1-encoded public key.
        public_key: Vec<u8>,
    },
    /// An Ed25519 key.
    Ed25519 {
        /// Raw public key.
        public_key: [u8; 32],
    },
}

impl<'a> KeyHandle<'a> {
    /// The algorithm of the held key.
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            KeyHandle::X25519(_) => KeyAlgorithm::X25519,
            KeyHandle::EccP256 { .. } => KeyAlgorithm::EccP256,
            KeyHandle::Ed25519 { .. } => KeyAlgorithm::Ed25519,
        }
    }

    /// The ECDH capability, if this is an X25519 key.
    pub fn as_x25519(&self) -> Option<&'a dyn Ecdh> {
        match self {
            KeyHandle::X25519(device) => Some(*device),
            _ => None,
        }
    }
}

impl fmt::Debug for KeyHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHandle({})", self.algorithm())
    }
}
