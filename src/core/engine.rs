use crate::config::RenewalSettings;
use crate::core::cleanup::{self, StateLayout};
use crate::core::expiry;
use crate::core::issuance;
use crate::core::materialize;
use crate::domain::model::{CommandSpec, DomainList, RenewalDecision};
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// How far a run goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Apply,
    /// Stop after the expiry gate.
    CheckOnly,
    /// Build the command and cleanup plan, change nothing.
    DryRun,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenewalOutcome {
    /// The gate said no; nothing else ran.
    Skipped { decision: RenewalDecision },
    Checked { decision: RenewalDecision },
    DryRun {
        decision: RenewalDecision,
        command: CommandSpec,
        would_remove: Vec<PathBuf>,
    },
    Renewed {
        decision: RenewalDecision,
        removed: Vec<PathBuf>,
        files: Vec<PathBuf>,
    },
}

pub struct RenewalEngine<R: CommandRunner> {
    runner: R,
    settings: RenewalSettings,
}

impl<R: CommandRunner> RenewalEngine<R> {
    pub fn new(runner: R, settings: RenewalSettings) -> Self {
        Self { runner, settings }
    }

    pub fn settings(&self) -> &RenewalSettings {
        &self.settings
    }

    pub async fn run(&self, force: bool, mode: RunMode) -> Result<RenewalOutcome> {
        self.run_at(force, mode, Utc::now()).await
    }

    /// Gate, cleanup guard, issuance and materialization, evaluated at `now`.
    pub async fn run_at(&self, force: bool, mode: RunMode, now: DateTime<Utc>) -> Result<RenewalOutcome> {
        let settings = &self.settings;
        tracing::info!("Starting renewal run for {}", settings.primary_domain);

        let decision = expiry::check_expiry(
            &settings.expiry_probe(),
            settings.threshold_days,
            force,
            now,
        )?;
        tracing::info!("Gate: {}", decision);

        if mode == RunMode::CheckOnly {
            return Ok(RenewalOutcome::Checked { decision });
        }
        if !decision.is_required() {
            return Ok(RenewalOutcome::Skipped { decision });
        }

        let domains = DomainList::load(&settings.domains_file)?;
        tracing::info!(
            "Loaded {} domains from {}",
            domains.len(),
            settings.domains_file.display()
        );
        issuance::check_credentials(&settings.credentials_file)?;

        let command = issuance::build_command(settings, &domains, force);
        let layout = StateLayout::new(&settings.state_dir);
        let lineages = cleanup::count_lineages(&layout, &settings.primary_domain);
        let clean = cleanup::should_clean(force, lineages);
        tracing::debug!("{} existing lineages, cleanup: {}", lineages, clean);

        if mode == RunMode::DryRun {
            let would_remove = if clean {
                cleanup::plan(&layout, &settings.primary_domain)
            } else {
                Vec::new()
            };
            tracing::info!("🔍 DRY RUN: would run {}", command);
            for path in &would_remove {
                tracing::info!("🔍 DRY RUN: would remove {}", path.display());
            }
            return Ok(RenewalOutcome::DryRun {
                decision,
                command,
                would_remove,
            });
        }

        let removed = if clean {
            cleanup::clean(&layout, &settings.primary_domain)
        } else {
            Vec::new()
        };

        issuance::issue(&self.runner, &command).await?;

        let files = materialize::materialize(
            &settings.live_dir(),
            &settings.output_dir,
            &settings.composite_file,
        )?;

        Ok(RenewalOutcome::Renewed {
            decision,
            removed,
            files,
        })
    }
}
