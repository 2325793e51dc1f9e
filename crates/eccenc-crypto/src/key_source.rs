//! Named byte sources for raw key material.
//!
//! A key resource is exactly 32 raw bytes with no header or encoding. Where
//! the bytes live (a directory, a table compiled into the binary, a test
//! fixture) is behind the [`KeySource`] trait; [`KeySource::load`] applies
//! the length rule identically for all of them.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};
use crate::keys::Key32;

/// A capability that returns the raw bytes stored under a logical name.
pub trait KeySource {
    /// Read every byte stored under `name`.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Load a 32-byte key.
    ///
    /// Fails with `ResourceUnavailable` if the resource cannot be read and
    /// with `InvalidKeyLength` if it does not hold exactly 32 bytes. The read
    /// buffer is wiped in both cases.
    fn load(&self, name: &str) -> Result<Key32> {
        let bytes = Zeroizing::new(self.read(name).map_err(|e| CryptoError::unavailable(name, e))?);
        let key = Key32::try_from(bytes.as_slice())?;
        debug!(name, len = bytes.len(), "Loaded key material");
        Ok(key)
    }
}

impl<S: KeySource + ?Sized> KeySource for &S {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        (**self).read(name)
    }
}

fn not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no key named '{name}'"))
}

/// In-memory key store, mainly for tests and fixtures.
#[derive(Default)]
pub struct MemorySource {
    entries: HashMap<String, Zeroizing<Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the bytes stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), Zeroizing::new(bytes.into()));
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }
}

impl fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl KeySource for MemorySource {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.entries
            .get(name)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| not_found(name))
    }
}

/// Keys compiled into the binary, e.g. with `include_bytes!`.
///
/// ```
/// use eccenc_crypto::{EmbeddedSource, KeySource};
///
/// static KEYS: EmbeddedSource = EmbeddedSource::new(&[("server.pub", &[9u8; 32])]);
/// assert!(KEYS.load("server.pub").is_ok());
/// ```
#[derive(Clone, Copy)]
pub struct EmbeddedSource {
    entries: &'static [(&'static str, &'static [u8])],
}

impl EmbeddedSource {
    pub const fn new(entries: &'static [(&'static str, &'static [u8])]) -> Self {
        Self { entries }
    }
}

impl fmt::Debug for EmbeddedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

impl KeySource for EmbeddedSource {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, bytes)| bytes.to_vec())
            .ok_or_else(|| not_found(name))
    }
}

/// Key files in a single directory; the logical name is the file name.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `name` to a path inside the directory.
    ///
    /// Only a single plain file name is accepted: empty names, absolute
    /// paths, separators and `..` are rejected with `InvalidInput`.
    pub fn path_for(&self, name: &str) -> io::Result<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => Ok(self.root.join(file)),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("key name '{name}' is not a plain file name"),
            )),
        }
    }

    /// Whether a key named `name` exists in the directory.
    pub fn contains(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|p| p.is_file())
    }

    /// Write a key file, creating the directory if needed.
    ///
    /// Secret keys are created with mode `0600` on Unix.
    pub fn store(
        &self,
        name: &str,
        bytes: &[u8; crate::KEY_SIZE],
        secret: bool,
    ) -> Result<PathBuf> {
        let path = self
            .path_for(name)
            .map_err(|e| CryptoError::unavailable(name, e))?;
        write_key_file(&self.root, &path, bytes, secret)
            .map_err(|e| CryptoError::unavailable(name, e))?;
        debug!(name, secret, path = %path.display(), "Stored key material");
        Ok(path)
    }
}

fn write_key_file(root: &Path, path: &Path, bytes: &[u8], secret: bool) -> io::Result<()> {
    use std::io::Write;

    std::fs::create_dir_all(root)?;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if secret {
            options.mode(0o600);
        }
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;

    // The mode above only applies to newly created files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if secret {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
    }
    #[cfg(not(unix))]
    let _ = secret;

    Ok(())
}

impl KeySource for DirSource {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.path_for(name)?)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn assert_invalid_length(result: Result<Key32>, len: usize) {
        match result {
            Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual,
            }) => assert_eq!(actual, len),
            other => panic!("expected InvalidKeyLength, got {other:?}"),
        }
    }

    #[test]
    fn memory_source_loads_exact_key() {
        let source = MemorySource::new().with("peer.pub", vec![0x42; 32]);
        let key = source.load("peer.pub").unwrap();
        assert_eq!(key.as_bytes(), &[0x42; 32]);
    }

    #[test]
    fn load_rejects_wrong_lengths() {
        for len in [0, 31, 33, 1024] {
            let source = MemorySource::new().with("k", vec![1u8; len]);
            assert_invalid_length(source.load("k"), len);
        }
    }

    #[test]
    fn missing_key_is_resource_unavailable() {
        let source = MemorySource::new();
        match source.load("missing.key") {
            Err(CryptoError::ResourceUnavailable { name, source }) => {
                assert_eq!(name, "missing.key");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected ResourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn embedded_source_lookup() {
        static KEYS: EmbeddedSource =
            EmbeddedSource::new(&[("a.key", &[1u8; 32]), ("short.key", &[1u8; 31])]);

        assert_eq!(KEYS.load("a.key").unwrap().as_bytes(), &[1u8; 32]);
        assert_invalid_length(KEYS.load("short.key"), 31);
        assert!(matches!(
            KEYS.load("b.key"),
            Err(CryptoError::ResourceUnavailable { .. })
        ));
    }

    fn load_via(source: impl KeySource, name: &str) -> Result<Key32> {
        source.load(name)
    }

    #[test]
    fn source_by_reference_and_trait_object() {
        let source = MemorySource::new().with("k", vec![5u8; 32]);
        let dyn_source: &dyn KeySource = &source;
        assert!(dyn_source.load("k").is_ok());
        assert!(load_via(&source, "k").is_ok());
    }

    #[test]
    fn dir_source_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path().join("keys"));

        let path = source.store("alice.pub", &[9u8; 32], false).unwrap();
        assert!(path.starts_with(source.root()));
        assert!(source.contains("alice.pub"));
        assert_eq!(source.load("alice.pub").unwrap().as_bytes(), &[9u8; 32]);
    }

    #[test]
    fn dir_source_rejects_wrong_file_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());
        for len in [0, 31, 33, 1024] {
            std::fs::write(dir.path().join("k"), vec![0u8; len]).unwrap();
            assert_invalid_length(source.load("k"), len);
        }
    }

    #[test]
    fn dir_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());
        match source.load("nope.key") {
            Err(CryptoError::ResourceUnavailable { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected ResourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn dir_source_rejects_non_plain_names() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());
        for name in ["", "..", "../etc/passwd", "/etc/passwd", "sub/key", "./key"] {
            match source.load(name) {
                Err(CryptoError::ResourceUnavailable { source, .. }) => {
                    assert_eq!(source.kind(), io::ErrorKind::InvalidInput, "name {name:?}");
                }
                other => panic!("expected InvalidInput for {name:?}, got {other:?}"),
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn secret_keys_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());
        let secret = source.store("me.key", &[1u8; 32], true).unwrap();

        let mode = std::fs::metadata(secret).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
