//! Recipient stanzas and X25519 candidate selection.
//!
//! A stanza is one recipient-specific block of an encrypted file header. The
//! header parser hands us every stanza in the file; only those shaped like an
//! X25519 stanza are worth a device round-trip.

use base64::{prelude::BASE64_STANDARD_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use crate::crypto::X25519PublicKey;
use crate::error::{CoreError, Result};

/// Tag identifying X25519 recipient stanzas.
pub const X25519_STANZA_TAG: &str = "X25519";

/// A parsed recipient stanza.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stanza {
    /// Recipient type tag.
    pub tag: String,

    /// Ordered arguments following the tag.
    pub args: Vec<String>,

    /// Opaque body bytes.
    pub body: Vec<u8>,
}

impl Stanza {
    /// Create a stanza from its parts.
    pub fn new(tag: impl Into<String>, args: Vec<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            tag: tag.into(),
            args,
            body: body.into(),
        }
    }

    /// Whether this stanza has the shape of an X25519 recipient stanza:
    /// the `X25519` tag and exactly one argument.
    pub fn is_x25519(&self) -> bool {
        self.tag == X25519_STANZA_TAG && self.args.len() == 1
    }

    /// The encoded ephemeral key argument, if this is an X25519 stanza.
    pub fn ephemeral_arg(&self) -> Option<&str> {
        if self.is_x25519() {
            self.args.first().map(String::as_str)
        } else {
            None
        }
    }
}

/// Select X25519 candidates, preserving input order.
///
/// Stanzas of other shapes are skipped silently; they belong to other
/// recipient types.
pub fn x25519_candidates(stanzas: &[Stanza]) -> impl Iterator<Item = (usize, &Stanza)> {
    stanzas.iter().enumerate().filter(|&(index, stanza)| {
        let keep = stanza.is_x25519();
        if !keep {
            tracing::trace!(index, tag = %stanza.tag, args = stanza.args.len(), "skipping stanza");
        }
        keep
    })
}

/// Decode the ephemeral public key from an X25519 stanza argument.
///
/// The argument is unpadded standard base64 of exactly 32 bytes. Every
/// 32-byte string is a valid X25519 u-coordinate; low-order points are caught
/// after the agreement by [`crate::SharedSecret::is_contributory`].
pub fn decode_ephemeral_key(arg: &str) -> Result<X25519PublicKey> {
    let bytes = BASE64_STANDARD_NO_PAD
        .decode(arg)
        .map_err(|e| CoreError::MalformedStanza(format!("ephemeral key is not base64: {}", e)))?;

    X25519PublicKey::try_from(bytes.as_slice()).map_err(|_| {
        CoreError::MalformedStanza(format!(
            "ephemeral key must be 32 bytes, got {}",
            bytes.len()
        ))
    })
}

/// Encode an ephemeral public key as a stanza argument.
pub fn encode_ephemeral_key(key: &X25519PublicKey) -> String {
    BASE64_STANDARD_NO_PAD.encode(key.as_bytes())
}
