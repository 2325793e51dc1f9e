//! Wire format for encrypted payloads.
//!
//! Layout: `[12-byte nonce][ciphertext, same length as plaintext][16-byte tag]`.
//! There is no version byte or length prefix; the total length implies the
//! plaintext length.

use crate::error::{CryptoError, Result};
use crate::{ENVELOPE_OVERHEAD, NONCE_SIZE, TAG_SIZE};

/// A decoded envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Nonce used for this message.
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext followed by the authentication tag.
    pub sealed: Vec<u8>,
}

impl Envelope {
    /// Split raw envelope bytes. Copies the input.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (nonce, sealed) = split(bytes)?;
        Ok(Self {
            nonce: *nonce,
            sealed: sealed.to_vec(),
        })
    }

    /// Serialize back to the wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_SIZE + self.sealed.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.sealed);
        out
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.sealed[..self.tag_offset()]
    }

    pub fn tag(&self) -> &[u8] {
        &self.sealed[self.tag_offset()..]
    }

    /// Length of the plaintext this envelope decrypts to.
    pub fn plaintext_len(&self) -> usize {
        self.tag_offset()
    }

    fn tag_offset(&self) -> usize {
        self.sealed.len().saturating_sub(TAG_SIZE)
    }
}

/// Borrowing split into nonce and `ciphertext || tag`.
///
/// Rejects anything shorter than nonce plus tag before any cipher runs.
pub(crate) fn split(bytes: &[u8]) -> Result<(&[u8; NONCE_SIZE], &[u8])> {
    let malformed = || CryptoError::MalformedEnvelope {
        minimum: ENVELOPE_OVERHEAD,
        actual: bytes.len(),
    };
    if bytes.len() < ENVELOPE_OVERHEAD {
        return Err(malformed());
    }
    bytes.split_first_chunk::<NONCE_SIZE>().ok_or_else(malformed)
}
