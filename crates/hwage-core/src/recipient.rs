//! X25519 recipients: Bech32 addresses and the encrypting side of the stanza.

use std::fmt;
use std::str::FromStr;

use bech32::{primitives::decode::CheckedHrpstring, Bech32, Hrp};
use rand::{CryptoRng, RngCore};
use x25519_dalek::{EphemeralSecret, PublicKey};

use crate::crypto::{FileKey, SharedSecret, X25519PublicKey};
use crate::error::{CoreError, Result};
use crate::kdf::derive_wrap_key;
use crate::stanza::{encode_ephemeral_key, Stanza, X25519_STANZA_TAG};
use crate::wrap::seal_file_key;

/// Human-readable part of an X25519 recipient address.
pub const RECIPIENT_HRP: &str = "age";

/// A public X25519 recipient, shareable as an `age1...` address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Recipient(X25519PublicKey);

impl Recipient {
    /// Create a recipient for a raw public key.
    pub const fn from_public_key(public_key: X25519PublicKey) -> Self {
        Self(public_key)
    }

    /// The recipient's public key.
    pub const fn public_key(&self) -> &X25519PublicKey {
        &self.0
    }

    /// Encode as a Bech32 address.
    ///
    /// The 32 key bytes are regrouped into 5-bit symbols (with padding) under
    /// the `age` HRP, using the Bech32 (not Bech32m) checksum.
    pub fn to_bech32(&self) -> Result<String> {
        bech32::encode::<Bech32>(Hrp::parse_unchecked(RECIPIENT_HRP), self.0.as_bytes())
            .map_err(|e| CoreError::InvalidRecipient(e.to_string()))
    }

    /// Wrap a file key for this recipient with a fresh ephemeral key.
    pub fn wrap_file_key(&self, file_key: &FileKey) -> Result<Stanza> {
        self.wrap_file_key_with_rng(file_key, rand::thread_rng())
    }

    /// Wrap a file key using the given RNG for the ephemeral key.
    pub fn wrap_file_key_with_rng<R: RngCore + CryptoRng>(
        &self,
        file_key: &FileKey,
        rng: R,
    ) -> Result<Stanza> {
        let ephemeral = EphemeralSecret::random_from_rng(rng);
        let ephemeral_public = X25519PublicKey::from(PublicKey::from(&ephemeral));

        let shared = SharedSecret::from(ephemeral.diffie_hellman(&self.0.to_dalek()));
        if !shared.is_contributory() {
            return Err(CoreError::InvalidRecipient(
                "recipient key is a low-order point".to_string(),
            ));
        }

        let wrap_key = derive_wrap_key(&shared, &ephemeral_public, &self.0)?;
        let body = seal_file_key(&wrap_key, file_key)?;

        Ok(Stanza::new(
            X25519_STANZA_TAG,
            vec![encode_ephemeral_key(&ephemeral_public)],
            body,
        ))
    }
}

impl From<X25519PublicKey> for Recipient {
    fn from(public_key: X25519PublicKey) -> Self {
        Self(public_key)
    }
}

impl FromStr for Recipient {
    type Err = CoreError;

    /// Parse an `age1...` address.
    fn from_str(s: &str) -> Result<Self> {
        let parsed = CheckedHrpstring::new::<Bech32>(s)
            .map_err(|e| CoreError::InvalidRecipient(e.to_string()))?;

        if !parsed.hrp().as_str().eq_ignore_ascii_case(RECIPIENT_HRP) {
            return Err(CoreError::InvalidRecipient(format!(
                "unexpected prefix: {}",
                parsed.hrp()
            )));
        }

        let bytes: Vec<u8> = parsed.byte_iter().collect();
        let key = X25519PublicKey::try_from(bytes.as_slice()).map_err(|_| {
            CoreError::InvalidRecipient(format!("expected 32 key bytes, got {}", bytes.len()))
        })?;

        Ok(Self(key))
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.to_bech32().map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl fmt::Debug for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recipient({})", self)
    }
}
