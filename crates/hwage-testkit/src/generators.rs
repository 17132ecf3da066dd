//! Proptest generators for property-based testing.

use proptest::prelude::*;

use hwage_core::{FileKey, SharedSecret, Stanza, X25519PublicKey, X25519_STANZA_TAG};

use crate::fixtures::TestFixture;

/// Generate a random file key.
pub fn file_key() -> impl Strategy<Value = FileKey> {
    any::<[u8; 16]>().prop_map(FileKey::from_bytes)
}

/// Generate a random shared secret.
pub fn shared_secret() -> impl Strategy<Value = SharedSecret> {
    any::<[u8; 32]>().prop_map(SharedSecret::from_bytes)
}

/// Generate a random (not necessarily valid) X25519 public key.
pub fn public_key() -> impl Strategy<Value = X25519PublicKey> {
    any::<[u8; 32]>().prop_map(X25519PublicKey::from_bytes)
}

/// Generate a stanza tag other than `X25519`.
pub fn foreign_tag() -> impl Strategy<Value = String> {
    "[A-Za-z0-9-]{1,16}".prop_filter("must not be the X25519 tag", |t| t != X25519_STANZA_TAG)
}

/// Generate an argument count that an X25519 stanza must not have.
pub fn wrong_arity() -> impl Strategy<Value = usize> {
    prop_oneof![Just(0usize), 2usize..6]
}

/// Generate a plaintext length other than the file key length.
pub fn wrong_file_key_len() -> impl Strategy<Value = usize> {
    prop_oneof![0usize..16, 17usize..64]
}

/// Generate a stanza that is not an X25519 candidate.
pub fn non_candidate_stanza() -> impl Strategy<Value = Stanza> {
    let body = prop::collection::vec(any::<u8>(), 0..64);
    prop_oneof![
        (foreign_tag(), prop::collection::vec("[A-Za-z0-9+/]{1,43}", 0..3), body.clone())
            .prop_map(|(tag, args, body)| Stanza::new(tag, args, body)),
        (wrong_arity(), body).prop_map(|(n, body)| {
            Stanza::new(X25519_STANZA_TAG, vec!["AAAA".to_string(); n], body)
        }),
    ]
}

/// Parameters for a multi-recipient stanza set with one stanza for us.
#[derive(Debug, Clone)]
pub struct StanzaSetParams {
    /// Seed for the local identity.
    pub seed: [u8; 32],
    /// The file key every stanza wraps.
    pub file_key: [u8; 16],
    /// Number of X25519 stanzas addressed to other keys.
    pub foreign: usize,
    /// Seed for shuffling the stanza order.
    pub shuffle_seed: u64,
}

impl Arbitrary for StanzaSetParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // seed
            any::<[u8; 16]>(), // file key
            0usize..6,         // foreign stanzas
            any::<u64>(),      // shuffle seed
        )
            .prop_map(|(seed, file_key, foreign, shuffle_seed)| StanzaSetParams {
                seed,
                file_key,
                foreign,
                shuffle_seed,
            })
            .boxed()
    }
}

/// Build the fixture and a shuffled stanza set from parameters.
///
/// The set holds one stanza for the fixture, `foreign` X25519 stanzas for
/// other keys, and one stanza of another recipient type.
pub fn stanza_set_from_params(params: &StanzaSetParams) -> (TestFixture, Vec<Stanza>) {
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    let fixture = TestFixture::with_seed(params.seed);
    let file_key = FileKey::from_bytes(params.file_key);

    let mut stanzas = vec![
        fixture.wrap_seeded(&file_key, params.shuffle_seed),
        Stanza::new("scrypt", vec!["c2FsdA".into(), "10".into()], vec![0; 32]),
    ];
    for i in 0..params.foreign {
        let mut seed = params.seed;
        seed[1] ^= 1 + i as u8;
        let wrap_seed = params.shuffle_seed.wrapping_add(1 + i as u64);
        stanzas.push(TestFixture::with_seed(seed).wrap_seeded(&file_key, wrap_seed));
    }

    stanzas.shuffle(&mut StdRng::seed_from_u64(params.shuffle_seed));
    (fixture, stanzas)
}
