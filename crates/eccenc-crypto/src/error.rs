//! Crypto error types.

/// Result type alias using [`CryptoError`].
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors from key loading, key agreement and envelope encryption.
///
/// No variant carries key material or plaintext.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Key resource '{name}' is unavailable: {source}")]
    ResourceUnavailable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Secure random source failed: {0}")]
    RandomnessFailure(#[source] rand::Error),

    /// The peer public key is low-order: X25519 produced the all-zero output.
    #[error("Peer public key is degenerate (non-contributory shared secret)")]
    DegenerateKey,

    #[error("Invalid cipher key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("Malformed envelope: need at least {minimum} bytes, got {actual}")]
    MalformedEnvelope { minimum: usize, actual: usize },

    /// ChaCha20-Poly1305 caps a single message at roughly 256 GiB.
    #[error("Plaintext too large for a single envelope")]
    PlaintextTooLarge,

    #[error("Authentication failed")]
    AuthenticationFailure,
}

impl CryptoError {
    pub(crate) fn unavailable(name: &str, source: std::io::Error) -> Self {
        Self::ResourceUnavailable {
            name: name.to_owned(),
            source,
        }
    }
}
