//! Wrap key derivation.
//!
//! `wrap_key = HKDF-SHA256(ikm = shared, salt = epk || recipient, info = X25519_INFO)`

use hkdf::Hkdf;
use sha2::Sha256;

use crate::crypto::{SharedSecret, WrapKey, X25519PublicKey};
use crate::error::{CoreError, Result};

/// HKDF info string for X25519 recipient stanzas.
pub const X25519_INFO: &[u8] = b"age-encryption.org/v1/X25519";

/// Derive the key wrapping one stanza's file key.
///
/// Pure and deterministic in its three inputs. The salt binds the wrap key to
/// both the ephemeral key and the recipient, in that order.
pub fn derive_wrap_key(
    shared: &SharedSecret,
    ephemeral: &X25519PublicKey,
    recipient: &X25519PublicKey,
) -> Result<WrapKey> {
    let mut salt = [0u8; 64];
    salt[..32].copy_from_slice(ephemeral.as_bytes());
    salt[32..].copy_from_slice(recipient.as_bytes());

    let hkdf = Hkdf::<Sha256>::new(Some(&salt), shared.as_bytes());

    let mut okm = [0u8; 32];
    hkdf.expand(X25519_INFO, &mut okm)
        .map_err(|e| CoreError::Derivation(e.to_string()))?;

    let wrap_key = WrapKey::from_bytes(okm);
    zeroize::Zeroize::zeroize(&mut okm);
    Ok(wrap_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> (SharedSecret, X25519PublicKey, X25519PublicKey) {
        (
            SharedSecret::from_bytes([0x01; 32]),
            X25519PublicKey::from_bytes([0x02; 32]),
            X25519PublicKey::from_bytes([0x03; 32]),
        )
    }

    #[test]
    fn test_derivation_deterministic() {
        let (shared, epk, rpk) = inputs();

        let key1 = derive_wrap_key(&shared, &epk, &rpk).unwrap();
        let key2 = derive_wrap_key(&shared, &epk, &rpk).unwrap();

        assert_eq!(key1, key2);
    }

    #[test]
    fn test_derivation_known_answer() {
        let (shared, epk, rpk) = inputs();
        let key = derive_wrap_key(&shared, &epk, &rpk).unwrap();

        assert_eq!(
            hex::encode(key.as_bytes()),
            "5e4c455bfda63c92ef1ceec6902d6b24b274b7638959d11040df97f303638d07"
        );
    }

    #[test]
    fn test_salt_order_matters() {
        let (shared, epk, rpk) = inputs();

        let forward = derive_wrap_key(&shared, &epk, &rpk).unwrap();
        let swapped = derive_wrap_key(&shared, &rpk, &epk).unwrap();

        assert_ne!(forward, swapped);
    }

    #[test]
    fn test_each_input_changes_output() {
        let (shared, epk, rpk) = inputs();
        let base = derive_wrap_key(&shared, &epk, &rpk).unwrap();

        let other_shared = SharedSecret::from_bytes([0x09; 32]);
        let other_key = X25519PublicKey::from_bytes([0x09; 32]);

        assert_ne!(base, derive_wrap_key(&other_shared, &epk, &rpk).unwrap());
        assert_ne!(base, derive_wrap_key(&shared, &other_key, &rpk).unwrap());
        assert_ne!(base, derive_wrap_key(&shared, &epk, &other_key).unwrap());
    }
}
