//! Key subcommands: keygen, pubkey.
//!
//! A keypair named `alice` lives in the key directory as `alice.key`
//! (private, mode 0600) and `alice.pub`.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::Write;

use anyhow::Context;
use tracing::info;

use eccenc_crypto::{DirSource, KeyPair, KeySource, PrivateKey, PublicKey, generate_keypair};

/// File name holding the private key for `name`.
pub fn private_file(name: &str) -> String {
    format!("{name}.key")
}

/// File name holding the public key for `name`.
pub fn public_file(name: &str) -> String {
    format!("{name}.pub")
}

/// Generate a keypair and store it under `name`.
///
/// Refuses to replace an existing private key unless `force` is set.
pub fn keygen(
    keys: &DirSource,
    name: &str,
    force: bool,
    out: &mut impl Write,
) -> anyhow::Result<PublicKey> {
    let secret_name = private_file(name);
    if !force && keys.contains(&secret_name) {
        anyhow::bail!(
            "Key '{name}' already exists in {}. Use --force to overwrite",
            keys.root().display()
        );
    }

    let pair = generate_keypair().context("Failed to generate keypair")?;
    keys.store(&secret_name, &pair.private.to_bytes(), true)?;
    keys.store(&public_file(name), pair.public.as_bytes(), false)?;
    info!(name, dir = %keys.root().display(), "Generated keypair");

    print_public(out, name, &pair.public)?;
    Ok(pair.public)
}

/// Load the private key `name` and print its public key.
pub fn pubkey(
    keys: &impl KeySource,
    name: &str,
    out: &mut impl Write,
) -> anyhow::Result<PublicKey> {
    let pair = load_pair(keys, name)?;
    print_public(out, name, &pair.public)?;
    Ok(pair.public)
}

/// Load our own keypair by name.
pub fn load_pair(keys: &impl KeySource, name: &str) -> anyhow::Result<KeyPair> {
    let key = keys
        .load(&private_file(name))
        .with_context(|| format!("Failed to load private key '{name}'"))?;
    Ok(KeyPair::from_private(PrivateKey::from(&key)))
}

/// Load a peer's public key by name.
pub fn load_peer(keys: &impl KeySource, name: &str) -> anyhow::Result<PublicKey> {
    let key = keys
        .load(&public_file(name))
        .with_context(|| format!("Failed to load public key '{name}'"))?;
    Ok(PublicKey::from(&key))
}

fn print_public(out: &mut impl Write, name: &str, public: &PublicKey) -> anyhow::Result<()> {
    writeln!(out, "Name:        {name}")?;
    writeln!(out, "Public key:  {public}")?;
    writeln!(out, "Fingerprint: {}", public.fingerprint())?;
    Ok(())
}
