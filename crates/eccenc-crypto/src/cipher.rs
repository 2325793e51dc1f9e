//! ChaCha20-Poly1305 envelope encryption keyed by a 32-byte shared secret.
//!
//! Every call draws a fresh random 96-bit nonce, so any number of threads
//! may encrypt under the same key without coordination. Reusing a
//! (key, nonce) pair breaks confidentiality; with random nonces the
//! collision risk stays negligible for well under 2^32 messages per key.

use chacha20poly1305::aead::{Aead, AeadInPlace, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::envelope;
use crate::error::{CryptoError, Result};
use crate::{ENVELOPE_OVERHEAD, KEY_SIZE, NONCE_SIZE};

fn new_cipher(key: &[u8]) -> Result<ChaCha20Poly1305> {
    ChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::InvalidKeySize {
        expected: KEY_SIZE,
        actual: key.len(),
    })
}

/// Encrypt `plaintext` into a `nonce || ciphertext || tag` envelope.
///
/// The envelope is always `plaintext.len() + 28` bytes.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_rng(&mut OsRng, key, plaintext, &[])
}

/// Decrypt an envelope produced by [`encrypt`].
///
/// Returns the plaintext only if the tag verifies; otherwise nothing is
/// recovered and the error does not say which part was wrong.
pub fn decrypt(key: &[u8], envelope: &[u8]) -> Result<Vec<u8>> {
    decrypt_with_aad(key, envelope, &[])
}

/// Like [`encrypt`], additionally binding the envelope to `aad`.
///
/// The associated data is not stored in the envelope; the receiver must
/// supply the same bytes to [`decrypt_with_aad`].
pub fn encrypt_with_aad(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_rng(&mut OsRng, key, plaintext, aad)
}

/// Encrypt drawing the nonce from `rng`.
pub fn encrypt_with_rng<R>(
    rng: &mut R,
    key: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let cipher = new_cipher(key)?;

    let mut nonce = [0u8; NONCE_SIZE];
    rng.try_fill_bytes(&mut nonce).map_err(CryptoError::RandomnessFailure)?;

    let mut out = Vec::with_capacity(plaintext.len() + ENVELOPE_OVERHEAD);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(plaintext);

    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), aad, &mut out[NONCE_SIZE..])
        .map_err(|_| CryptoError::PlaintextTooLarge)?;
    out.extend_from_slice(&tag);

    Ok(out)
}

/// Decrypt an envelope produced by [`encrypt_with_aad`].
pub fn decrypt_with_aad(key: &[u8], envelope: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let (nonce, sealed) = envelope::split(envelope)?;
    let cipher = new_cipher(key)?;

    cipher
        .decrypt(Nonce::from_slice(nonce), Payload { msg: sealed, aad })
        .map_err(|_| {
            debug!(len = envelope.len(), "Envelope failed authentication");
            CryptoError::AuthenticationFailure
        })
}
