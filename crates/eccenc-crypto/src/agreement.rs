//! X25519 key agreement.
//!
//! Keypairs are generated from a cryptographically secure RNG and shared
//! secrets are derived by scalar multiplication with the peer's public point.
//! A peer key that forces the all-zero output is rejected rather than
//! yielding a predictable secret.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::debug;
use zeroize::Zeroizing;

use crate::KEY_SIZE;
use crate::error::{CryptoError, Result};
use crate::keys::{PrivateKey, PublicKey, SharedSecret};

/// A private key together with its public key.
#[derive(Debug)]
pub struct KeyPair {
    pub private: PrivateKey,
    pub public: PublicKey,
}

impl KeyPair {
    /// Rebuild the pair for a long-lived private key loaded from storage.
    pub fn from_private(private: PrivateKey) -> Self {
        let public = private.public_key();
        Self { private, public }
    }
}

/// Generate a fresh keypair from the operating system RNG.
pub fn generate_keypair() -> Result<KeyPair> {
    generate_keypair_with(&mut OsRng)
}

/// Generate a fresh keypair from `rng`.
///
/// An RNG that cannot supply bytes yields `RandomnessFailure`.
pub fn generate_keypair_with<R>(rng: &mut R) -> Result<KeyPair>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
    rng.try_fill_bytes(bytes.as_mut_slice())
        .map_err(CryptoError::RandomnessFailure)?;
    Ok(KeyPair::from_private(PrivateKey::from_bytes(*bytes)))
}

/// Derive the shared secret between our private key and a peer public key.
///
/// Both parties arrive at the same value:
/// `derive(a.private, b.public) == derive(b.private, a.public)`.
pub fn derive_shared_secret(private: &PrivateKey, peer: &PublicKey) -> Result<SharedSecret> {
    let peer_point = x25519_dalek::PublicKey::from(peer.to_bytes());
    let shared = private.secret().diffie_hellman(&peer_point);
    if !shared.was_contributory() {
        debug!(%peer, "Rejected low-order peer public key");
        return Err(CryptoError::DegenerateKey);
    }
    debug!(%peer, "Derived shared secret");
    Ok(SharedSecret::from_bytes(shared.to_bytes()))
}
