//! CLI configuration management.
//!
//! Persists the key directory, default key names and log format to
//! `~/.eccenc/config.json`. Command-line flags always win over stored values.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Persistent CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Directory holding `<name>.key` / `<name>.pub` files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_dir: Option<PathBuf>,
    /// Default name of our own keypair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Default name of the peer whose public key we encrypt to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_key: Option<String>,
    /// Emit JSON log lines on stderr.
    #[serde(default)]
    pub log_json: bool,
}

impl CliConfig {
    /// Path to the config directory: `~/.eccenc/`.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".eccenc"))
    }

    /// Path to the config file: `~/.eccenc/config.json`.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.json"))
    }

    /// Load config from `path`. Returns default if the file doesn't exist or is invalid.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `path`, creating the parent directory.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Key directory: `flag`, then config, then `~/.eccenc/keys`.
    pub fn resolve_key_dir(&self, flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        flag.or_else(|| self.key_dir.clone())
            .or_else(|| Self::config_dir().map(|d| d.join("keys")))
            .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory; pass --key-dir"))
    }

    /// Our key name: `flag`, then config.
    pub fn resolve_private(&self, flag: Option<String>) -> anyhow::Result<String> {
        flag.or_else(|| self.private_key.clone()).ok_or_else(|| {
            anyhow::anyhow!("No private key selected. Use --private <name> or `eccenc config set --private <name>`")
        })
    }

    /// Peer key name: `flag`, then config.
    pub fn resolve_peer(&self, flag: Option<String>) -> anyhow::Result<String> {
        flag.or_else(|| self.peer_key.clone()).ok_or_else(|| {
            anyhow::anyhow!("No peer key selected. Use --peer <name> or `eccenc config set --peer <name>`")
        })
    }
}

/// Config subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the stored configuration.
    Show,
    /// Update stored defaults.
    Set {
        /// Directory holding key files.
        #[arg(long)]
        key_dir: Option<PathBuf>,
        /// Default name of our own keypair.
        #[arg(long)]
        private: Option<String>,
        /// Default peer name.
        #[arg(long)]
        peer: Option<String>,
        /// Emit JSON log lines.
        #[arg(long)]
        log_json: Option<bool>,
    },
}

/// Execute a config subcommand against the config stored at `path`.
pub fn run(
    action: ConfigAction,
    config: &mut CliConfig,
    path: &Path,
    out: &mut impl std::io::Write,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            writeln!(out, "{}", serde_json::to_string_pretty(config)?)?;
        }
        ConfigAction::Set {
            key_dir,
            private,
            peer,
            log_json,
        } => {
            if key_dir.is_some() {
                config.key_dir = key_dir;
            }
            if private.is_some() {
                config.private_key = private;
            }
            if peer.is_some() {
                config.peer_key = peer;
            }
            if let Some(log_json) = log_json {
                config.log_json = log_json;
            }
            config.save_to(path)?;
            writeln!(out, "Saved {}", path.display())?;
        }
    }
    Ok(())
}
