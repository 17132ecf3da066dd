//! # hwage
//!
//! Hardware-held X25519 identities for age-encrypted files.
//!
//! ## Overview
//!
//! An encrypted file carries one recipient stanza per recipient. Given those
//! stanzas, an [`Identity`] finds the one addressed to its key and recovers
//! the 16-byte file key. The private key never leaves its holder: the
//! identity only asks it for X25519 agreements through the [`device::Ecdh`]
//! capability.
//!
//! ## Failure Policy
//!
//! - Stanzas of other recipient types are skipped
//! - Malformed stanzas, device failures, and authentication failures move on
//!   to the next candidate
//! - Derivation and file key length failures abort with [`UnwrapError::Core`]
//! - Running out of candidates yields [`UnwrapError::NoMatch`], after which a
//!   caller may try another identity (see [`unwrap_with_identities`])
//!
//! Diagnostics are emitted through `tracing`; nothing is printed unless a
//! subscriber is installed, and no key material is ever logged.
//!
//! ## Usage
//!
//! ```rust
//! use hwage::{Identity, UnwrapConfig};
//! use hwage::core::FileKey;
//! use hwage::device::{KeyAuth, KeyHandle, SoftwareX25519};
//!
//! let device = SoftwareX25519::generate();
//! let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none())
//!     .unwrap()
//!     .with_config(UnwrapConfig::default().max_device_attempts(8));
//!
//! let file_key = FileKey::generate();
//! let stanza = identity.recipient().wrap_file_key(&file_key).unwrap();
//!
//! assert_eq!(identity.unwrap_stanzas(&[stanza]).unwrap(), file_key);
//! ```
//!
//! ## Re-exports
//!
//! - `hwage::core` - Protocol primitives (stanzas, derivation, recipients)
//! - `hwage::device` - The ECDH capability and software keys

pub mod config;
pub mod error;
pub mod identity;
pub mod timeout;

// Re-export component crates
pub use hwage_core as core;
pub use hwage_device as device;

pub use config::UnwrapConfig;
pub use error::{Result, UnwrapError};
pub use identity::{unwrap_with_identities, Identity};
pub use timeout::unwrap_with_timeout;

// Re-export commonly used types
pub use hwage_core::{FileKey, Recipient, Stanza, X25519PublicKey};
pub use hwage_device::{DeviceError, Ecdh, KeyAlgorithm, KeyAuth, KeyHandle};
