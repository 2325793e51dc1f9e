//! Encrypt and decrypt subcommands.
//!
//! Both sides load their own private key and the peer's public key, derive
//! the shared secret, and exchange envelopes. Input and output default to
//! stdin/stdout; `-` selects them explicitly.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;
use zeroize::Zeroizing;

use eccenc_crypto::{KeySource, SharedSecret, decrypt, derive_shared_secret, encrypt};

use crate::config::CliConfig;
use crate::key_cmd::{load_pair, load_peer};

/// Arguments shared by `encrypt` and `decrypt`.
#[derive(clap::Args, Debug, Default)]
pub struct CryptArgs {
    /// Name of our own keypair (default: from config)
    #[arg(long)]
    pub private: Option<String>,

    /// Name of the peer's public key (default: from config)
    #[arg(long)]
    pub peer: Option<String>,

    /// Input file (default: stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Which way the payload goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

/// Derive the shared secret between our keypair and the named peer.
pub fn shared_secret(
    keys: &impl KeySource,
    private: &str,
    peer: &str,
) -> anyhow::Result<SharedSecret> {
    let pair = load_pair(keys, private)?;
    let peer_public = load_peer(keys, peer)?;
    derive_shared_secret(&pair.private, &peer_public)
        .with_context(|| format!("Peer key '{peer}' rejected"))
}

/// Encrypt or decrypt `input` in memory.
pub fn transform(
    mode: Mode,
    keys: &impl KeySource,
    private: &str,
    peer: &str,
    input: &[u8],
) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    let secret = shared_secret(keys, private, peer)?;
    let output = match mode {
        Mode::Encrypt => encrypt(secret.as_bytes(), input)?,
        Mode::Decrypt => decrypt(secret.as_bytes(), input).context("Failed to decrypt input")?,
    };
    Ok(Zeroizing::new(output))
}

/// Execute `encrypt` / `decrypt`.
///
/// Nothing is written to the output unless the whole operation succeeds.
pub fn run(
    mode: Mode,
    args: CryptArgs,
    keys: &impl KeySource,
    config: &CliConfig,
) -> anyhow::Result<()> {
    let private = config.resolve_private(args.private)?;
    let peer = config.resolve_peer(args.peer)?;

    let input = read_input(args.input.as_deref())?;
    let output = transform(mode, keys, &private, &peer, &input)?;
    write_output(args.output.as_deref(), &output, mode == Mode::Decrypt)?;

    info!(?mode, %private, %peer, in_len = input.len(), out_len = output.len(), "Done");
    Ok(())
}

fn is_stdio(path: Option<&Path>) -> bool {
    path.is_none_or(|p| p == Path::new("-"))
}

fn read_input(path: Option<&Path>) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    let mut buf = Zeroizing::new(Vec::new());
    match path {
        Some(p) if !is_stdio(path) => {
            *buf = std::fs::read(p).with_context(|| format!("Failed to read {}", p.display()))?;
        }
        _ => {
            io::stdin()
                .lock()
                .read_to_end(&mut *buf)
                .context("Failed to read stdin")?;
        }
    }
    Ok(buf)
}

fn write_output(path: Option<&Path>, data: &[u8], private: bool) -> anyhow::Result<()> {
    match path {
        Some(p) if !is_stdio(path) => {
            write_file(p, data, private)
                .with_context(|| format!("Failed to write {}", p.display()))?;
        }
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Write `data` to `path`. Recovered plaintext is readable by the owner only.
fn write_file(path: &Path, data: &[u8], private: bool) -> io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if private {
            options.mode(0o600);
        }
    }
    let mut file = options.open(path)?;
    file.write_all(data)?;

    // The mode above only applies to newly created files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if private {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use eccenc_crypto::{CryptoError, DirSource, MemorySource, generate_keypair};

    use super::*;
    use crate::key_cmd::{keygen, private_file, public_file};

    fn two_party_source() -> MemorySource {
        let alice = generate_keypair().unwrap();
        let bob = generate_keypair().unwrap();
        MemorySource::new()
            .with(private_file("alice"), alice.private.to_bytes().to_vec())
            .with(public_file("alice"), alice.public.as_bytes().to_vec())
            .with(private_file("bob"), bob.private.to_bytes().to_vec())
            .with(public_file("bob"), bob.public.as_bytes().to_vec())
    }

    #[test]
    fn transform_roundtrip_between_parties() {
        let keys = two_party_source();
        let envelope = transform(Mode::Encrypt, &keys, "alice", "bob", b"hello bob").unwrap();
        assert_eq!(envelope.len(), 9 + 28);

        let plaintext = transform(Mode::Decrypt, &keys, "bob", "alice", &envelope).unwrap();
        assert_eq!(plaintext.as_slice(), b"hello bob");
    }

    #[test]
    fn tampered_input_is_authentication_failure() {
        let keys = two_party_source();
        let mut envelope = transform(Mode::Encrypt, &keys, "alice", "bob", b"data").unwrap();
        envelope[20] ^= 0x01;

        let err = transform(Mode::Decrypt, &keys, "bob", "alice", &envelope).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CryptoError>(),
            Some(CryptoError::AuthenticationFailure)
        ));
    }

    #[test]
    fn degenerate_peer_key_is_rejected() {
        let keys = two_party_source().with(public_file("zero"), vec![0u8; 32]);
        let err = shared_secret(&keys, "alice", "zero").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CryptoError>(),
            Some(CryptoError::DegenerateKey)
        ));
    }

    #[test]
    fn run_with_files_and_config_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let keys = DirSource::new(dir.path().join("keys"));
        keygen(&keys, "alice", false, &mut Vec::new()).unwrap();
        keygen(&keys, "bob", false, &mut Vec::new()).unwrap();

        let plain_path = dir.path().join("msg.txt");
        let sealed_path = dir.path().join("msg.bin");
        let opened_path = dir.path().join("msg.out");
        std::fs::write(&plain_path, b"example plaintext").unwrap();

        let alice_cfg = CliConfig {
            private_key: Some("alice".into()),
            peer_key: Some("bob".into()),
            ..Default::default()
        };
        run(
            Mode::Encrypt,
            CryptArgs {
                input: Some(plain_path),
                output: Some(sealed_path.clone()),
                ..Default::default()
            },
            &keys,
            &alice_cfg,
        )
        .unwrap();
        assert_eq!(std::fs::read(&sealed_path).unwrap().len(), 17 + 28);

        // Flags override the (empty) config on bob's side.
        run(
            Mode::Decrypt,
            CryptArgs {
                private: Some("bob".into()),
                peer: Some("alice".into()),
                input: Some(sealed_path),
                output: Some(opened_path.clone()),
            },
            &keys,
            &CliConfig::default(),
        )
        .unwrap();
        assert_eq!(std::fs::read(opened_path).unwrap(), b"example plaintext");
    }

    #[test]
    fn failed_decrypt_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let keys = DirSource::new(dir.path());
        keygen(&keys, "alice", false, &mut Vec::new()).unwrap();
        keygen(&keys, "bob", false, &mut Vec::new()).unwrap();

        let garbage = dir.path().join("garbage.bin");
        let out = dir.path().join("out.txt");
        std::fs::write(&garbage, [0u8; 64]).unwrap();

        let result = run(
            Mode::Decrypt,
            CryptArgs {
                private: Some("bob".into()),
                peer: Some("alice".into()),
                input: Some(garbage),
                output: Some(out.clone()),
            },
            &keys,
            &CliConfig::default(),
        );
        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[cfg(unix)]
    #[test]
    fn decrypted_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let keys = DirSource::new(dir.path());
        keygen(&keys, "alice", false, &mut Vec::new()).unwrap();
        keygen(&keys, "bob", false, &mut Vec::new()).unwrap();

        let plain_path = dir.path().join("msg.txt");
        let sealed_path = dir.path().join("msg.bin");
        let opened_path = dir.path().join("msg.out");
        std::fs::write(&plain_path, b"top secret").unwrap();
        // Pre-existing output keeps its old mode unless reset.
        std::fs::write(&opened_path, b"stale").unwrap();
        std::fs::set_permissions(&opened_path, std::fs::Permissions::from_mode(0o644)).unwrap();

        run(
            Mode::Encrypt,
            CryptArgs {
                private: Some("alice".into()),
                peer: Some("bob".into()),
                input: Some(plain_path),
                output: Some(sealed_path.clone()),
            },
            &keys,
            &CliConfig::default(),
        )
        .unwrap();
        run(
            Mode::Decrypt,
            CryptArgs {
                private: Some("bob".into()),
                peer: Some("alice".into()),
                input: Some(sealed_path),
                output: Some(opened_path.clone()),
            },
            &keys,
            &CliConfig::default(),
        )
        .unwrap();

        assert_eq!(std::fs::read(&opened_path).unwrap(), b"top secret");
        let mode = std::fs::metadata(&opened_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn dash_means_stdio() {
        assert!(is_stdio(None));
        assert!(is_stdio(Some(Path::new("-"))));
        assert!(!is_stdio(Some(Path::new("file.bin"))));
    }
}
