use anyhow::Context;
use cert_courier::config::cli::parse_args;
use cert_courier::config::toml_config;
use cert_courier::domain::model::HostOutcome;
use cert_courier::utils::logger;
use cert_courier::{CertError, DispatchCliConfig, Dispatcher, SystemCommandRunner};

fn fail(e: &CertError) -> ! {
    tracing::error!("❌ Dispatch aborted: {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli: DispatchCliConfig = parse_args();

    let file_config = match toml_config::load_optional(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let log_file = cli.log_file.as_deref().or(file_config.log_file());
    logger::init_cli_logger(cli.verbose, log_file, file_config.log_format())
        .context("failed to open log file")?;

    let mut settings = match file_config.dispatch_settings() {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };
    if !cli.hosts.is_empty() {
        tracing::info!("🔧 Host list overridden: {}", cli.hosts.join(", "));
        settings = match settings.with_hosts(cli.hosts.clone()) {
            Ok(settings) => settings,
            Err(e) => fail(&e),
        };
    }

    let dispatcher = Dispatcher::new(SystemCommandRunner::new(), settings);
    let report = match dispatcher.run().await {
        Ok(report) => report,
        Err(e) => fail(&e),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in &report.outcomes {
            match outcome {
                HostOutcome::Delivered { host, files, .. } => {
                    println!("✅ {}: {} files delivered", host, files)
                }
                HostOutcome::Failed {
                    host,
                    stage,
                    message,
                } => println!("❌ {}: failed to {}: {}", host, stage, message),
            }
        }
        println!(
            "Summary: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
    }

    // 只有全部主機失敗才回傳錯誤
    std::process::exit(report.exit_code());
}
