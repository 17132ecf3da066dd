//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: software identities, stanza
//! sets with foreign recipients mixed in, and instrumented devices.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;

use hwage::{Identity, KeyAuth, KeyHandle};
use hwage_core::{
    derive_wrap_key, encode_ephemeral_key, seal_body, FileKey, Recipient, SharedSecret, Stanza,
    X25519PublicKey, X25519_STANZA_TAG,
};
use hwage_device::{DeviceError, Ecdh, SoftwareX25519};

/// A test fixture with a software key and its authorization.
pub struct TestFixture {
    pub device: SoftwareX25519,
    pub auth: KeyAuth,
}

impl TestFixture {
    /// Create a new test fixture with a random key.
    pub fn new() -> Self {
        Self {
            device: SoftwareX25519::generate(),
            auth: KeyAuth::none(),
        }
    }

    /// Create with a deterministic key from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            device: SoftwareX25519::from_bytes(seed),
            auth: KeyAuth::none(),
        }
    }

    /// Get the key's public half.
    pub fn public_key(&self) -> X25519PublicKey {
        self.device.public_key()
    }

    /// The recipient for this fixture's key.
    pub fn recipient(&self) -> Recipient {
        Recipient::from_public_key(self.public_key())
    }

    /// An identity borrowing this fixture's device.
    pub fn identity(&self) -> Identity<'_> {
        identity_for(&self.device, self.auth.clone())
    }

    /// Wrap `file_key` for this fixture.
    pub fn wrap(&self, file_key: &FileKey) -> Stanza {
        wrap_for(&self.public_key(), file_key)
    }

    /// Wrap `file_key` with a seeded ephemeral key.
    pub fn wrap_seeded(&self, file_key: &FileKey, seed: u64) -> Stanza {
        self.recipient()
            .wrap_file_key_with_rng(file_key, StdRng::seed_from_u64(seed))
            .expect("wrapping for a valid key cannot fail")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-recipient tests.
///
/// # Panics
///
/// Panics if `count` exceeds 256, the number of distinct seeds available.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = 0xa5;
            seed[1] = u8::try_from(i).expect("at most 256 parties");
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// An X25519 identity over any device.
pub fn identity_for(device: &dyn Ecdh, auth: KeyAuth) -> Identity<'_> {
    Identity::new(KeyHandle::X25519(device), auth).expect("X25519 handles are always supported")
}

/// Wrap `file_key` for a raw public key.
pub fn wrap_for(recipient: &X25519PublicKey, file_key: &FileKey) -> Stanza {
    Recipient::from_public_key(*recipient)
        .wrap_file_key(file_key)
        .expect("wrapping for a valid key cannot fail")
}

/// An X25519 stanza addressed to a fresh random key.
pub fn foreign_stanza(file_key: &FileKey) -> Stanza {
    wrap_for(&SoftwareX25519::generate().public_key(), file_key)
}

/// Stanzas that must never reach the device: other recipient types and
/// X25519 stanzas with the wrong number of arguments.
pub fn non_candidate_stanzas(file_key: &FileKey) -> Vec<Stanza> {
    let x25519 = foreign_stanza(file_key);

    let mut no_args = x25519.clone();
    no_args.args.clear();

    let mut two_args = x25519.clone();
    two_args.args.push(two_args.args[0].clone());

    let mut lowercase = x25519;
    lowercase.tag = "x25519".to_string();

    vec![
        Stanza::new("scrypt", vec!["c2FsdHNhbHRzYWx0c2FsdA".into(), "18".into()], vec![0; 32]),
        Stanza::new(
            "ssh-ed25519",
            vec!["AAAA".into(), "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB".into()],
            vec![0; 32],
        ),
        no_args,
        two_args,
        lowercase,
    ]
}

/// A stanza whose body authenticates for `recipient` but carries `plaintext`
/// instead of a 16-byte file key.
pub fn stanza_with_plaintext(recipient: &X25519PublicKey, plaintext: &[u8]) -> Stanza {
    let ephemeral = SoftwareX25519::generate();
    let epk = ephemeral.public_key();

    let shared = ephemeral
        .ecdh(&KeyAuth::none(), recipient)
        .expect("software ECDH cannot fail");
    let wrap_key =
        derive_wrap_key(&shared, &epk, recipient).expect("HKDF cannot fail for 32 bytes");
    let body = seal_body(&wrap_key, plaintext).expect("sealing cannot fail");

    Stanza::new(X25519_STANZA_TAG, vec![encode_ephemeral_key(&epk)], body)
}

/// Flip one bit of a stanza body.
pub fn flip_body_bit(stanza: &Stanza, bit: usize) -> Stanza {
    let mut tampered = stanza.clone();
    if !tampered.body.is_empty() {
        let bit = bit % (tampered.body.len() * 8);
        tampered.body[bit / 8] ^= 1 << (bit % 8);
    }
    tampered
}

/// Records every ECDH request it forwards.
pub struct CountingDevice<D> {
    inner: D,
    calls: AtomicUsize,
    peers: Mutex<Vec<X25519PublicKey>>,
}

impl<D: Ecdh> CountingDevice<D> {
    /// Wrap a device.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            peers: Mutex::new(Vec::new()),
        }
    }

    /// Number of ECDH requests seen.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Peer keys of every request, in order.
    pub fn peers(&self) -> Vec<X25519PublicKey> {
        self.peers.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl<D: Ecdh> Ecdh for CountingDevice<D> {
    fn public_key(&self) -> X25519PublicKey {
        self.inner.public_key()
    }

    fn ecdh(&self, auth: &KeyAuth, peer: &X25519PublicKey) -> hwage_device::Result<SharedSecret> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut peers) = self.peers.lock() {
            peers.push(*peer);
        }
        self.inner.ecdh(auth, peer)
    }
}

/// A device that is never able to complete a request.
pub struct FailingDevice {
    public: X25519PublicKey,
    message: &'static str,
}

impl FailingDevice {
    /// A failing device presenting `public` as its key.
    pub fn new(public: X25519PublicKey, message: &'static str) -> Self {
        Self { public, message }
    }
}

impl Ecdh for FailingDevice {
    fn public_key(&self) -> X25519PublicKey {
        self.public
    }

    fn ecdh(&self, _auth: &KeyAuth, _peer: &X25519PublicKey) -> hwage_device::Result<SharedSecret> {
        Err(DeviceError::new(self.message))
    }
}
