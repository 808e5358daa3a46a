use anyhow::Context;
use cert_courier::config::cli::parse_args;
use cert_courier::config::toml_config;
use cert_courier::utils::logger;
use cert_courier::{CertError, CliConfig, RenewalEngine, RenewalOutcome, RunMode, SystemCommandRunner};

fn fail(e: &CertError) -> ! {
    tracing::error!("❌ Renewal failed: {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli: CliConfig = parse_args();

    // 載入配置 (logger 尚未初始化，錯誤直接輸出)
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

    tracing::info!("Starting cert-courier");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let settings = match file_config.renewal_settings() {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };

    let mode = if cli.check {
        RunMode::CheckOnly
    } else if cli.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Apply
    };

    let engine = RenewalEngine::new(SystemCommandRunner::new(), settings);

    match engine.run(cli.force, mode).await {
        Ok(RenewalOutcome::Skipped { decision }) | Ok(RenewalOutcome::Checked { decision }) => {
            println!("✅ {}: {}", engine.settings().primary_domain, decision);
        }
        Ok(RenewalOutcome::DryRun {
            command,
            would_remove,
            ..
        }) => {
            println!("🔍 Would run: {}", command);
            for path in would_remove {
                println!("🔍 Would remove: {}", path.display());
            }
        }
        Ok(RenewalOutcome::Renewed { files, .. }) => {
            tracing::info!("✅ Renewal completed successfully!");
            println!("✅ Renewal completed successfully!");
            for file in files {
                println!("📁 {}", file.display());
            }
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
