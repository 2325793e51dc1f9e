//! eccenc CLI Library
//!
//! Command implementations for the `eccenc` binary: key generation,
//! envelope encryption/decryption between two keyholders, and the
//! persisted CLI configuration.

pub mod config;
pub mod crypt_cmd;
pub mod key_cmd;
pub mod tracing_init;
