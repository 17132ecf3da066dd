//! Golden test vectors for cross-implementation verification.
//!
//! Each vector was computed with an independent X25519 / HKDF-SHA256 /
//! ChaCha20-Poly1305 / Bech32 implementation. Any implementation of the
//! X25519 recipient stanza must reproduce every field.

use hwage::{Identity, KeyAuth, KeyHandle};
use hwage_core::{
    decode_ephemeral_key, derive_wrap_key, Recipient, SharedSecret, Stanza, X25519PublicKey,
    X25519_STANZA_TAG,
};
use hwage_device::{Ecdh, SoftwareX25519};

/// A golden stanza vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Identity secret scalar (hex).
    pub identity_secret: &'static str,
    /// Expected recipient address.
    pub recipient: &'static str,
    /// Stanza argument: unpadded base64 of the ephemeral public key.
    pub stanza_arg: &'static str,
    /// Expected X25519 shared secret (hex).
    pub shared_secret: &'static str,
    /// Expected wrap key (hex).
    pub wrap_key: &'static str,
    /// Stanza body (hex).
    pub body: &'static str,
    /// Expected file key (hex).
    pub file_key: &'static str,
}

impl GoldenVector {
    /// The stanza this vector describes.
    pub fn stanza(&self) -> Stanza {
        Stanza::new(
            X25519_STANZA_TAG,
            vec![self.stanza_arg.to_string()],
            decode_hex(self.body),
        )
    }

    /// A software device holding the vector's identity secret.
    pub fn device(&self) -> SoftwareX25519 {
        SoftwareX25519::from_bytes(decode_hex32(self.identity_secret))
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "RFC 7748 key pair with sequential file key",
            identity_secret: "77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a",
            recipient: "age1s5s0qzvfxzn4gayt0hwtg0hhtgxm7wsdycup4a8t5j5ca25mfe4qt4hs7q",
            stanza_arg: "3p7bfXt9wbTTW2HC7OQ1Nz+DQ8hbeGdNrfx+FG+IK08",
            shared_secret: "4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742",
            wrap_key: "49f455ceee83d0030e514c6dfc6412a5fd2d482f8efbd2509155ad67b4df520d",
            body: "1d5e3fe9df021ce3ba766db1e4d4c898d741ea56e0c54344dd537b6dd907c0cd",
            file_key: "000102030405060708090a0b0c0d0e0f",
        },
        GoldenVector {
            name: "rage test identity with all-ones file key",
            identity_secret: "400bef1d8036f72664f0b7a5a62cfc956ed0765c641387636f534e8cb81e5058",
            recipient: "age1t7rxyev2z3rw82stdlrrepyc39nvn86l5078zqkf5uasdy86jp6svpy7pa",
            stanza_arg: "EyxEK+AQ+9V+cmAzKKp25x/MwVA6riGTJ9FNnJmT9HI",
            shared_secret: "eff75bd3b0bb7f4c36f48d811d80f506a415b35f82fd4505430caff9f798a750",
            wrap_key: "22f5d3ea9252999617289e512cda290ed49ca76f12c04a55a9db10cb34486dfb",
            body: "e91bb34bd9d63fbf3327a1aa0330dd301c8b8ca5e4f53085f9345403e5c1e977",
            file_key: "ffffffffffffffffffffffffffffffff",
        },
    ]
}

/// Result of checking one vector: name and the first mismatching field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorReport {
    /// The vector's name.
    pub name: String,
    /// The first field that did not match, if any.
    pub mismatch: Option<&'static str>,
}

impl VectorReport {
    /// Whether every field matched.
    pub fn passed(&self) -> bool {
        self.mismatch.is_none()
    }
}

/// Verify one vector against this implementation.
pub fn verify_vector(vector: &GoldenVector) -> VectorReport {
    VectorReport {
        name: vector.name.to_string(),
        mismatch: first_mismatch(vector),
    }
}

/// Verify all golden vectors.
pub fn verify_all_vectors() -> Vec<VectorReport> {
    all_vectors().iter().map(verify_vector).collect()
}

fn first_mismatch(vector: &GoldenVector) -> Option<&'static str> {
    let device = vector.device();
    let public: X25519PublicKey = device.public_key();

    if Recipient::from_public_key(public).to_string() != vector.recipient {
        return Some("recipient");
    }

    let Ok(ephemeral) = decode_ephemeral_key(vector.stanza_arg) else {
        return Some("stanza_arg");
    };

    let shared: SharedSecret = match device.ecdh(&KeyAuth::none(), &ephemeral) {
        Ok(shared) => shared,
        Err(_) => return Some("shared_secret"),
    };
    if hex::encode(shared.as_bytes()) != vector.shared_secret {
        return Some("shared_secret");
    }

    match derive_wrap_key(&shared, &ephemeral, &public) {
        Ok(wrap_key) if hex::encode(wrap_key.as_bytes()) == vector.wrap_key => {}
        _ => return Some("wrap_key"),
    }

    let identity = match Identity::new(KeyHandle::X25519(&device), KeyAuth::none()) {
        Ok(identity) => identity,
        Err(_) => return Some("identity"),
    };
    match identity.unwrap_stanzas(&[vector.stanza()]) {
        Ok(file_key) if hex::encode(file_key.as_bytes()) == vector.file_key => None,
        _ => Some("file_key"),
    }
}

fn decode_hex(s: &str) -> Vec<u8> {
    hex::decode(s).expect("golden vector fields are valid hex")
}

fn decode_hex32(s: &str) -> [u8; 32] {
    decode_hex(s)
        .try_into()
        .expect("golden vector secrets are 32 bytes")
}
