//! File key wrapping with ChaCha20-Poly1305.
//!
//! Every wrap key is derived fresh for one stanza and seals exactly one
//! message, so the nonce is fixed at zero.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use zeroize::Zeroizing;

use crate::crypto::{FileKey, WrapKey, FILE_KEY_LEN};
use crate::error::{CoreError, Result};

fn cipher(wrap_key: &WrapKey) -> ChaCha20Poly1305 {
    ChaCha20Poly1305::new(Key::from_slice(wrap_key.as_bytes()))
}

/// Seal arbitrary bytes under a wrap key with the zero nonce and no AAD.
///
/// Only [`seal_file_key`] should be used to build real stanzas; this lower
/// level entry point exists so malformed bodies can be produced on purpose.
pub fn seal_body(wrap_key: &WrapKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    cipher(wrap_key)
        .encrypt(&Nonce::default(), plaintext)
        .map_err(|e| CoreError::Encryption(e.to_string()))
}

/// Seal a file key into a stanza body.
pub fn seal_file_key(wrap_key: &WrapKey, file_key: &FileKey) -> Result<Vec<u8>> {
    seal_body(wrap_key, file_key.as_bytes())
}

/// Open a stanza body and recover the file key.
///
/// A tag mismatch is [`CoreError::Authentication`]: the stanza is for someone
/// else or was tampered with. A body that authenticates but is not exactly
/// 16 bytes is [`CoreError::FileKeyLength`].
pub fn unwrap_file_key(wrap_key: &WrapKey, body: &[u8]) -> Result<FileKey> {
    let plaintext = Zeroizing::new(
        cipher(wrap_key)
            .decrypt(&Nonce::default(), body)
            .map_err(|_| CoreError::Authentication)?,
    );

    let bytes: [u8; FILE_KEY_LEN] =
        plaintext
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::FileKeyLength {
                expected: FILE_KEY_LEN,
                actual: plaintext.len(),
            })?;

    Ok(FileKey::from_bytes(bytes))
}
