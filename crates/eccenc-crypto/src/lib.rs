//! Point-to-point payload encryption.
//!
//! Two parties holding X25519 keypairs derive a shared secret and exchange
//! ChaCha20-Poly1305 envelopes keyed by it.
//!
//! ## Pipeline
//!
//! - **Key sources**: named 32-byte key resources ([`KeySource`]), backed by a
//!   directory, a table compiled into the binary, or memory
//! - **Key agreement**: [`generate_keypair`] and [`derive_shared_secret`]
//!   (low-order peer keys are rejected)
//! - **Encryption**: [`encrypt`] / [`decrypt`] over the
//!   `nonce(12) || ciphertext || tag(16)` wire format
//!
//! Every operation returns a [`CryptoError`] instead of aborting, including
//! entropy failures.

pub mod agreement;
pub mod cipher;
pub mod envelope;
pub mod error;
pub mod key_source;
pub mod keys;

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod test_util;

pub use agreement::{KeyPair, derive_shared_secret, generate_keypair, generate_keypair_with};
pub use cipher::{decrypt, decrypt_with_aad, encrypt, encrypt_with_aad, encrypt_with_rng};
pub use envelope::Envelope;
pub use error::{CryptoError, Result};
pub use key_source::{DirSource, EmbeddedSource, KeySource, MemorySource};
pub use keys::{Key32, PrivateKey, PublicKey, SharedSecret, fingerprint_of};

/// Size of private keys, public keys and shared secrets.
pub const KEY_SIZE: usize = 32;

/// Nonce size for ChaCha20-Poly1305.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size.
pub const TAG_SIZE: usize = 16;

/// Bytes an envelope adds on top of the plaintext.
pub const ENVELOPE_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;
