#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;
pub mod toml_config;

pub use settings::{DispatchSettings, RenewalSettings};
pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Flags of the renewal entry point.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "cert-courier")]
#[command(about = "Renew the TLS bundle via a DNS-01 challenge when it is close to expiry")]
pub struct CliConfig {
    /// Renew regardless of expiry and clear the issuance client's state for the domain first
    #[arg(short, long)]
    pub force: bool,

    /// TOML file overriding the built-in settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only report the days left and whether a renewal is due
    #[arg(long, conflicts_with = "dry_run")]
    pub check: bool,

    /// Print the issuance command and planned cleanup without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Append log output to this file (overrides [logging] file)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
