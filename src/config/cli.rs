use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

/// Flags of the fan-out dispatcher.
#[derive(Debug, Clone, Parser)]
#[command(name = "dispatch_certs")]
#[command(about = "Copy the certificate bundle to every configured host over ssh/scp")]
pub struct DispatchCliConfig {
    /// TOML file overriding the built-in settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dispatch to these hosts instead of the configured list (repeatable)
    #[arg(long = "host", value_name = "HOST")]
    pub hosts: Vec<String>,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Append log output to this file (overrides [logging] file)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Parses argv; help exits 0, any usage error exits 1.
pub fn parse_args<T: Parser>() -> T {
    parse_args_from(std::env::args_os()).unwrap_or_else(|code| std::process::exit(code))
}

/// Like [`parse_args`] but returns the exit code instead of exiting.
pub fn parse_args_from<T, I, A>(args: I) -> Result<T, i32>
where
    T: Parser,
    I: IntoIterator<Item = A>,
    A: Into<std::ffi::OsString> + Clone,
{
    T::try_parse_from(args).map_err(|e| {
        let _ = e.print();
        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => 1,
        }
    })
}
