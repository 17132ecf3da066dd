//! # hwage Device
//!
//! The ECDH capability seam between the unwrap protocol and whatever holds
//! the private key.
//!
//! ## Key Types
//!
//! - [`Ecdh`] - One operation: agree on a shared secret with a peer key
//! - [`KeyHandle`] - A slot's key, tagged by algorithm; only X25519 does ECDH
//! - [`KeyAuth`] - PIN and touch policy presented with each request
//! - [`SoftwareX25519`] - An in-memory key for tests and software identities
//! - [`Serialized`] - Serializes requests to a single physical device

pub mod auth;
pub mod error;
pub mod handle;
pub mod serialized;
pub mod software;
pub mod traits;

pub use auth::{KeyAuth, Pin, PinPolicy, TouchPolicy};
pub use error::{DeviceError, Result};
pub use handle::{KeyAlgorithm, KeyHandle};
pub use serialized::Serialized;
pub use software::SoftwareX25519;
pub use traits::Ecdh;
