//! eccenc CLI
//!
//! Generates X25519 keypairs and encrypts/decrypts payloads between two
//! keyholders using ChaCha20-Poly1305 envelopes.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use eccenc_cli::config::{self, CliConfig, ConfigAction};
use eccenc_cli::crypt_cmd::{self, CryptArgs, Mode};
use eccenc_cli::key_cmd;
use eccenc_cli::tracing_init::init_tracing;
use eccenc_crypto::DirSource;

#[derive(Parser, Debug)]
#[command(name = "eccenc")]
#[command(version, about = "Point-to-point payload encryption with X25519 + ChaCha20-Poly1305", long_about = None)]
struct Cli {
    /// Config file (default: ~/.eccenc/config.json)
    #[arg(long, global = true, env = "ECCENC_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding key files (default: from config, then ~/.eccenc/keys)
    #[arg(long, global = true, env = "ECCENC_KEY_DIR")]
    key_dir: Option<PathBuf>,

    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a keypair and store it as <name>.key / <name>.pub
    Keygen {
        /// Keypair name
        name: String,
        /// Overwrite an existing keypair
        #[arg(long)]
        force: bool,
    },
    /// Print the public key and fingerprint of a stored keypair
    Pubkey {
        /// Keypair name
        name: String,
    },
    /// Encrypt a payload for a peer
    Encrypt(CryptArgs),
    /// Decrypt a payload from a peer
    Decrypt(CryptArgs),
    /// Show or update stored defaults
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(CliConfig::config_path)
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory; pass --config"))?;
    let mut config = CliConfig::load_from(&config_path);

    init_tracing("eccenc=info", cli.log_json || config.log_json);
    debug!(version = env!("CARGO_PKG_VERSION"), config = %config_path.display(), "Starting eccenc");

    let keys = DirSource::new(config.resolve_key_dir(cli.key_dir)?);

    match cli.command {
        Commands::Keygen { name, force } => {
            key_cmd::keygen(&keys, &name, force, &mut io::stdout().lock())?;
        }
        Commands::Pubkey { name } => {
            key_cmd::pubkey(&keys, &name, &mut io::stdout().lock())?;
        }
        Commands::Encrypt(args) => crypt_cmd::run(Mode::Encrypt, args, &keys, &config)?,
        Commands::Decrypt(args) => crypt_cmd::run(Mode::Decrypt, args, &keys, &config)?,
        Commands::Config { action } => {
            config::run(action, &mut config, &config_path, &mut io::stdout().lock())?;
        }
    }

    Ok(())
}
