//! Identities backed by an ECDH capability.
//!
//! An [`Identity`] scans the stanzas of an encrypted file for the one
//! addressed to its key:
//!
//! ```text
//! Scanning ──(candidate matched)──▶ Success
//!    │
//!    └──(candidates exhausted)──▶ Exhausted (NoMatch)
//! ```
//!
//! Malformed stanzas, device failures, and authentication failures skip to
//! the next candidate. Derivation and length failures abort the scan.

use std::fmt;

use hwage_core::{
    decode_ephemeral_key, derive_wrap_key, unwrap_file_key, x25519_candidates, CoreError,
    FileKey, Recipient, Stanza, X25519PublicKey,
};
use hwage_device::{DeviceError, Ecdh, KeyAuth, KeyHandle};

use crate::config::UnwrapConfig;
use crate::error::{Result, UnwrapError};

/// Why a candidate stanza was passed over.
#[derive(Debug)]
enum Rejection {
    Malformed(CoreError),
    Device(DeviceError),
    Authentication,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Malformed(e) => write!(f, "{}", e),
            Rejection::Device(e) => write!(f, "{}", e),
            Rejection::Authentication => f.write_str("body failed authentication"),
        }
    }
}

/// Outcome of trying one candidate.
enum Trial {
    Matched(FileKey),
    Rejected(Rejection),
    LimitReached,
}

/// An X25519 identity whose private key is held elsewhere.
///
/// Borrows the capability; holds the authorization material presented with
/// each request. Carries no state between unwraps.
pub struct Identity<'a> {
    device: &'a dyn Ecdh,
    auth: KeyAuth,
    public_key: X25519PublicKey,
    config: UnwrapConfig,
}

impl<'a> Identity<'a> {
    /// Create an identity from a key handle.
    ///
    /// Fails with [`UnwrapError::UnsupportedAlgorithm`] unless the handle is
    /// an X25519 key.
    pub fn new(handle: KeyHandle<'a>, auth: KeyAuth) -> Result<Self> {
        let device = handle
            .as_x25519()
            .ok_or_else(|| UnwrapError::UnsupportedAlgorithm(handle.algorithm()))?;

        Ok(Self {
            device,
            auth,
            public_key: device.public_key(),
            config: UnwrapConfig::default(),
        })
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: UnwrapConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &UnwrapConfig {
        &self.config
    }

    /// The identity's public key.
    pub fn public_key(&self) -> &X25519PublicKey {
        &self.public_key
    }

    /// The recipient that encrypts to this identity.
    pub fn recipient(&self) -> Recipient {
        Recipient::from_public_key(self.public_key)
    }

    /// Find the stanza addressed to this identity and recover its file key.
    ///
    /// Candidates are tried one at a time in file order; the first that
    /// authenticates wins. Returns [`UnwrapError::NoMatch`] when none does.
    pub fn unwrap_stanzas(&self, stanzas: &[Stanza]) -> Result<FileKey> {
        let mut attempts = 0usize;

        for (index, stanza) in x25519_candidates(stanzas) {
            let trial = self.try_stanza(stanza, &mut attempts).map_err(|e| {
                tracing::warn!(index, error = %e, "aborting unwrap");
                e
            })?;

            match trial {
                Trial::Matched(file_key) => {
                    tracing::debug!(index, attempts, "stanza matched");
                    return Ok(file_key);
                }
                Trial::Rejected(Rejection::Device(e)) => {
                    tracing::warn!(index, error = %e, "device failed, trying next stanza");
                }
                Trial::Rejected(reason) => {
                    if self.config.log_rejections {
                        tracing::debug!(index, %reason, "stanza rejected");
                    }
                }
                Trial::LimitReached => {
                    tracing::warn!(index, attempts, "device attempt limit reached");
                    break;
                }
            }
        }

        Err(UnwrapError::NoMatch)
    }

    fn try_stanza(&self, stanza: &Stanza, attempts: &mut usize) -> Result<Trial> {
        let Some(arg) = stanza.ephemeral_arg() else {
            return Ok(Trial::Rejected(Rejection::Malformed(
                CoreError::MalformedStanza("not an X25519 stanza".to_string()),
            )));
        };

        let ephemeral = match decode_ephemeral_key(arg) {
            Ok(key) => key,
            Err(e) => return Ok(Trial::Rejected(Rejection::Malformed(e))),
        };

        if self
            .config
            .max_device_attempts
            .is_some_and(|limit| *attempts >= limit)
        {
            return Ok(Trial::LimitReached);
        }
        *attempts += 1;

        let shared = match self.device.ecdh(&self.auth, &ephemeral) {
            Ok(shared) => shared,
            Err(e) => return Ok(Trial::Rejected(Rejection::Device(e))),
        };

        if !shared.is_contributory() {
            return Ok(Trial::Rejected(Rejection::Malformed(
                CoreError::MalformedStanza("ephemeral key is a low-order point".to_string()),
            )));
        }

        let wrap_key = derive_wrap_key(&shared, &ephemeral, &self.public_key)?;
        drop(shared);

        match unwrap_file_key(&wrap_key, &stanza.body) {
            Ok(file_key) => Ok(Trial::Matched(file_key)),
            Err(CoreError::Authentication) => Ok(Trial::Rejected(Rejection::Authentication)),
            Err(e) => Err(e.into()),
        }
    }
}

impl fmt::Debug for Identity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("recipient", &self.recipient())
            .field("auth", &self.auth)
            .field("config", &self.config)
            .finish()
    }
}

/// Try each identity in turn until one finds its stanza.
///
/// An identity that reports [`UnwrapError::NoMatch`] hands over to the next;
/// any other error stops the search.
pub fn unwrap_with_identities(identities: &[Identity<'_>], stanzas: &[Stanza]) -> Result<FileKey> {
    for identity in identities {
        match identity.unwrap_stanzas(stanzas) {
            Err(UnwrapError::NoMatch) => continue,
            result => return result,
        }
    }

    Err(UnwrapError::NoMatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwage_core::{encode_ephemeral_key, seal_body, X25519_STANZA_TAG};
    use hwage_device::SoftwareX25519;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts ECDH requests and fails the first `fail_first` of them.
    struct CountingDevice {
        inner: SoftwareX25519,
        calls: AtomicUsize,
        fail_first: usize,
    }

    impl CountingDevice {
        fn new(inner: SoftwareX25519) -> Self {
            Self {
                inner,
                calls: AtomicUsize::new(0),
                fail_first: 0,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Ecdh for CountingDevice {
        fn public_key(&self) -> X25519PublicKey {
            self.inner.public_key()
        }

        fn ecdh(
            &self,
            auth: &KeyAuth,
            peer: &X25519PublicKey,
        ) -> hwage_device::Result<hwage_core::SharedSecret> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(DeviceError::new("touch not confirmed"));
            }
            self.inner.ecdh(auth, peer)
        }
    }

    fn stanza_for(recipient: &X25519PublicKey, file_key: &FileKey) -> Stanza {
        Recipient::from_public_key(*recipient)
            .wrap_file_key(file_key)
            .unwrap()
    }

    /// A stanza whose body authenticates for `recipient` but holds `plaintext`.
    fn stanza_with_plaintext(recipient: &X25519PublicKey, plaintext: &[u8]) -> Stanza {
        let ephemeral = SoftwareX25519::generate();
        let epk = ephemeral.public_key();
        let shared = ephemeral.ecdh(&KeyAuth::none(), recipient).unwrap();
        let wrap_key = derive_wrap_key(&shared, &epk, recipient).unwrap();

        Stanza::new(
            X25519_STANZA_TAG,
            vec![encode_ephemeral_key(&epk)],
            seal_body(&wrap_key, plaintext).unwrap(),
        )
    }

    fn foreign_stanza(file_key: &FileKey) -> Stanza {
        stanza_for(&SoftwareX25519::generate().public_key(), file_key)
    }

    #[test]
    fn test_matches_own_stanza_among_others() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let device = CountingDevice::new(SoftwareX25519::generate());
        let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none()).unwrap();
        let file_key = FileKey::generate();

        let stanzas = vec![
            foreign_stanza(&file_key),
            Stanza::new("scrypt", vec!["salt".into(), "18".into()], vec![1, 2, 3]),
            stanza_for(identity.public_key(), &file_key),
            foreign_stanza(&file_key),
        ];

        assert_eq!(identity.unwrap_stanzas(&stanzas).unwrap(), file_key);
        assert_eq!(device.calls(), 2);
    }

    #[test]
    fn test_no_match_when_no_stanza_is_ours() {
        let device = SoftwareX25519::generate();
        let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none()).unwrap();
        let file_key = FileKey::generate();

        let stanzas = vec![foreign_stanza(&file_key), foreign_stanza(&file_key)];

        let err = identity.unwrap_stanzas(&stanzas).unwrap_err();
        assert!(err.is_no_match());
    }

    #[test]
    fn test_empty_stanza_list_is_no_match() {
        let device = SoftwareX25519::generate();
        let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none()).unwrap();

        assert!(identity.unwrap_stanzas(&[]).unwrap_err().is_no_match());
    }

    #[test]
    fn test_wrong_shape_never_reaches_device() {
        let device = CountingDevice::new(SoftwareX25519::generate());
        let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none()).unwrap();
        let mut good = stanza_for(identity.public_key(), &FileKey::generate());

        let mut wrong_tag = good.clone();
        wrong_tag.tag = "X25518".to_string();
        let mut no_args = good.clone();
        no_args.args.clear();
        good.args.push("extra".to_string());

        let err = identity
            .unwrap_stanzas(&[wrong_tag, no_args, good])
            .unwrap_err();
        assert!(err.is_no_match());
        assert_eq!(device.calls(), 0);
    }

    #[test]
    fn test_malformed_argument_skipped_without_device() {
        let device = CountingDevice::new(SoftwareX25519::generate());
        let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none()).unwrap();
        let file_key = FileKey::generate();

        let stanzas = vec![
            Stanza::new(X25519_STANZA_TAG, vec!["!!not-base64!!".into()], vec![0; 32]),
            Stanza::new(X25519_STANZA_TAG, vec!["AAAA".into()], vec![0; 32]),
            stanza_for(identity.public_key(), &file_key),
        ];

        assert_eq!(identity.unwrap_stanzas(&stanzas).unwrap(), file_key);
        assert_eq!(device.calls(), 1);
    }

    #[test]
    fn test_low_order_ephemeral_is_skipped() {
        let device = SoftwareX25519::generate();
        let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none()).unwrap();
        let file_key = FileKey::generate();

        let low_order = Stanza::new(
            X25519_STANZA_TAG,
            vec![encode_ephemeral_key(&X25519PublicKey::from_bytes([0; 32]))],
            vec![0; 32],
        );

        let err = identity.unwrap_stanzas(&[low_order.clone()]).unwrap_err();
        assert!(err.is_no_match());

        let stanzas = vec![low_order, stanza_for(identity.public_key(), &file_key)];
        assert_eq!(identity.unwrap_stanzas(&stanzas).unwrap(), file_key);
    }

    #[test]
    fn test_device_failure_moves_to_next_stanza() {
        let mut device = CountingDevice::new(SoftwareX25519::generate());
        device.fail_first = 1;
        let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none()).unwrap();
        let file_key = FileKey::generate();

        let ours = stanza_for(identity.public_key(), &file_key);
        let stanzas = vec![ours.clone(), ours];

        assert_eq!(identity.unwrap_stanzas(&stanzas).unwrap(), file_key);
        assert_eq!(device.calls(), 2);
    }

    #[test]
    fn test_device_failure_on_every_stanza_is_no_match() {
        let mut device = CountingDevice::new(SoftwareX25519::generate());
        device.fail_first = usize::MAX;
        let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none()).unwrap();

        let stanzas = vec![stanza_for(identity.public_key(), &FileKey::generate())];

        assert!(identity.unwrap_stanzas(&stanzas).unwrap_err().is_no_match());
        assert_eq!(device.calls(), 1);
    }

    #[test]
    fn test_length_mismatch_aborts_scan() {
        let device = CountingDevice::new(SoftwareX25519::generate());
        let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none()).unwrap();
        let file_key = FileKey::generate();

        let stanzas = vec![
            stanza_with_plaintext(identity.public_key(), &[0x42; 17]),
            stanza_for(identity.public_key(), &file_key),
        ];

        let err = identity.unwrap_stanzas(&stanzas).unwrap_err();
        assert!(matches!(
            err,
            UnwrapError::Core(CoreError::FileKeyLength {
                expected: 16,
                actual: 17
            })
        ));
        assert_eq!(device.calls(), 1);
    }

    #[test]
    fn test_attempt_limit_stops_scan() {
        let device = CountingDevice::new(SoftwareX25519::generate());
        let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none())
            .unwrap()
            .with_config(UnwrapConfig::default().max_device_attempts(2));
        let file_key = FileKey::generate();

        let stanzas = vec![
            foreign_stanza(&file_key),
            foreign_stanza(&file_key),
            stanza_for(identity.public_key(), &file_key),
        ];

        assert!(identity.unwrap_stanzas(&stanzas).unwrap_err().is_no_match());
        assert_eq!(device.calls(), 2);
    }

    #[test]
    fn test_pin_is_presented_to_device() {
        let device = SoftwareX25519::generate().with_pin("123456", hwage_device::PinPolicy::Always);
        let file_key = FileKey::generate();
        let stanzas = vec![stanza_for(&device.public_key(), &file_key)];

        let locked = Identity::new(KeyHandle::X25519(&device), KeyAuth::none()).unwrap();
        assert!(locked.unwrap_stanzas(&stanzas).unwrap_err().is_no_match());

        let unlocked =
            Identity::new(KeyHandle::X25519(&device), KeyAuth::with_pin("123456")).unwrap();
        assert_eq!(unlocked.unwrap_stanzas(&stanzas).unwrap(), file_key);
    }

    #[test]
    fn test_unsupported_algorithm() {
        let err = Identity::new(
            KeyHandle::EccP256 {
                public_key: vec![0x04; 65],
            },
            KeyAuth::none(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            UnwrapError::UnsupportedAlgorithm(hwage_device::KeyAlgorithm::EccP256)
        ));
    }

    #[test]
    fn test_recipient_matches_device_key() {
        let device = SoftwareX25519::generate();
        let identity = Identity::new(KeyHandle::X25519(&device), KeyAuth::none()).unwrap();

        let parsed: Recipient = identity.recipient().to_string().parse().unwrap();
        assert_eq!(parsed.public_key(), &device.public_key());
    }

    #[test]
    fn test_unwrap_with_identities() {
        let first = SoftwareX25519::generate();
        let second = SoftwareX25519::generate();
        let identities = vec![
            Identity::new(KeyHandle::X25519(&first), KeyAuth::none()).unwrap(),
            Identity::new(KeyHandle::X25519(&second), KeyAuth::none()).unwrap(),
        ];
        let file_key = FileKey::generate();

        let stanzas = vec![stanza_for(&second.public_key(), &file_key)];
        assert_eq!(unwrap_with_identities(&identities, &stanzas).unwrap(), file_key);

        let stanzas = vec![foreign_stanza(&file_key)];
        assert!(unwrap_with_identities(&identities, &stanzas)
            .unwrap_err()
            .is_no_match());
    }

    #[test]
    fn test_unwrap_with_identities_stops_on_structural_error() {
        let first = SoftwareX25519::generate();
        let second = CountingDevice::new(SoftwareX25519::generate());
        let identities = vec![
            Identity::new(KeyHandle::X25519(&first), KeyAuth::none()).unwrap(),
            Identity::new(KeyHandle::X25519(&second), KeyAuth::none()).unwrap(),
        ];

        let stanzas = vec![stanza_with_plaintext(&first.public_key(), &[0; 15])];

        let err = unwrap_with_identities(&identities, &stanzas).unwrap_err();
        assert!(matches!(err, UnwrapError::Core(CoreError::FileKeyLength { .. })));
        assert_eq!(second.calls(), 0);
    }

    #[test]
    fn test_debug_does_not_leak_pin() {
        let device = SoftwareX25519::generate();
        let identity =
            Identity::new(KeyHandle::X25519(&device), KeyAuth::with_pin("987654")).unwrap();

        let debug = format!("{:?}", identity);
        assert!(debug.contains("age1"));
        assert!(!debug.contains("987654"));
    }
}
