use crate::logging::LogFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Create and extract age-encrypted tar.gz archives sealed to SSH keys.
///
/// Archives are encrypted to the SSH public keys published for an
/// identifier (a GitHub username by default). Recipients decrypt with their
/// SSH private key. Supported key types: RSA, Ed25519.
#[derive(Parser, Debug)]
#[command(name = "tgzx", version, about)]
pub struct Cli {
    /// Logging level or filter directive (debug, info, warn, error)
    #[arg(long, global = true, env = "SSH_TGZX_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format, written to stderr
    #[arg(
        long,
        global = true,
        env = "SSH_TGZX_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,

    /// Base URL key listings are fetched from, as `{url}/{identifier}.keys`
    #[arg(long, global = true, env = "SSH_TGZX_KEYS_URL", value_name = "URL")]
    pub keys_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an encrypted archive for an identifier's public keys
    Create(CreateArgs),
    /// List the contents of an encrypted archive
    List(ListArgs),
    /// Decrypt and extract an archive
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Whose published SSH keys the archive is sealed to
    pub identifier: String,

    /// Encrypted archive to write
    pub archive_file: PathBuf,

    /// Files and directories to archive
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    pub archive_file: PathBuf,

    /// SSH private key to decrypt with
    pub identity_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    pub archive_file: PathBuf,

    /// SSH private key to decrypt with
    pub identity_file: PathBuf,

    /// Directory to extract into (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,
}
