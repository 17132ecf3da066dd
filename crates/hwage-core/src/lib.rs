//! # hwage Core
//!
//! Pure protocol for X25519 recipient stanzas in age-encrypted files.
//!
//! This crate contains no I/O and no device access. The private-key half of
//! the exchange is supplied by the caller as a [`SharedSecret`]; everything
//! around it lives here.
//!
//! ## Unwrapping one stanza
//!
//! 1. [`x25519_candidates`] keeps stanzas tagged `X25519` with one argument
//! 2. [`decode_ephemeral_key`] turns that argument into an [`X25519PublicKey`]
//! 3. The key holder computes the shared secret (see `hwage-device`)
//! 4. [`derive_wrap_key`] runs HKDF-SHA256 over the shared secret
//! 5. [`unwrap_file_key`] opens the body with ChaCha20-Poly1305
//!
//! ## Wrapping
//!
//! [`Recipient`] is the encrypting side: it prints as an `age1...` address
//! and produces stanzas that the steps above can open.
//!
//! ```rust
//! use hwage_core::{FileKey, Recipient};
//!
//! let recipient: Recipient = "age1t7rxyev2z3rw82stdlrrepyc39nvn86l5078zqkf5uasdy86jp6svpy7pa"
//!     .parse()
//!     .unwrap();
//! let stanza = recipient.wrap_file_key(&FileKey::generate()).unwrap();
//! assert_eq!(stanza.tag, "X25519");
//! ```

pub mod crypto;
pub mod error;
pub mod kdf;
pub mod recipient;
pub mod stanza;
pub mod wrap;

pub use crypto::{FileKey, SharedSecret, WrapKey, X25519PublicKey, FILE_KEY_LEN};
pub use error::{CoreError, Result};
pub use kdf::{derive_wrap_key, X25519_INFO};
pub use recipient::{Recipient, RECIPIENT_HRP};
pub use stanza::{
    decode_ephemeral_key, encode_ephemeral_key, x25519_candidates, Stanza, X25519_STANZA_TAG,
};
pub use wrap::{seal_body, seal_file_key, unwrap_file_key};
