pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::DispatchCliConfig, CliConfig};

pub use adapters::SystemCommandRunner;
pub use config::{DispatchSettings, RenewalSettings, TomlConfig};
pub use core::{
    dispatch::Dispatcher,
    engine::{RenewalEngine, RenewalOutcome, RunMode},
};
pub use utils::error::{CertError, Result};
