use crate::config::DispatchSettings;
use crate::domain::model::{
    CommandSpec, DispatchReport, DispatchStage, HostOutcome, Verification,
};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{CertError, Result};
use std::path::{Path, PathBuf};

/// Regular files directly inside `dir`, sorted by name.
///
/// A missing directory or one without files is a precondition failure.
pub fn collect_local_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CertError::MissingFile {
            what: "local certificate directory".to_string(),
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(CertError::MissingFile {
            what: "certificate files".to_string(),
            path: dir.to_path_buf(),
        });
    }
    Ok(files)
}

/// Sequential ssh/scp fan-out over the configured hosts.
pub struct Dispatcher<R: CommandRunner> {
    runner: R,
    settings: DispatchSettings,
}

impl<R: CommandRunner> Dispatcher<R> {
    pub fn new(runner: R, settings: DispatchSettings) -> Self {
        Self { runner, settings }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    fn connect_opts(&self) -> Vec<String> {
        vec![
            "-o".to_string(),
            format!("ConnectTimeout={}", self.settings.connect_timeout_secs),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
        ]
    }

    fn remote_shell(&self, host: &str, remote_cmd: String) -> CommandSpec {
        CommandSpec::new(&self.settings.ssh_bin)
            .args(self.connect_opts())
            .arg(self.settings.target(host))
            .arg(remote_cmd)
    }

    pub fn mkdir_command(&self, host: &str) -> CommandSpec {
        self.remote_shell(host, format!("mkdir -p '{}'", self.settings.remote_dir))
    }

    pub fn copy_command(&self, host: &str, files: &[PathBuf]) -> CommandSpec {
        CommandSpec::new(&self.settings.scp_bin)
            .args(self.connect_opts())
            .args(files.iter().map(|f| f.to_string_lossy().to_string()))
            .arg(format!(
                "{}:{}/",
                self.settings.target(host),
                self.settings.remote_dir.trim_end_matches('/')
            ))
    }

    /// `ls -1A` prints one name per line with no header or total line.
    pub fn list_command(&self, host: &str) -> CommandSpec {
        self.remote_shell(host, format!("ls -1A '{}'", self.settings.remote_dir))
    }

    /// Runs one step; spawn errors and non-zero exits both become a message.
    async fn step(&self, command: &CommandSpec) -> std::result::Result<String, String> {
        match self.runner.run(command).await {
            Ok(output) if output.success() => Ok(output.stdout),
            Ok(output) => Err(CertError::ToolFailed {
                tool: command.program.clone(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            }
            .to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn verify(&self, host: &str, expected: usize) -> Verification {
        match self.step(&self.list_command(host)).await {
            Ok(listing) => {
                let found = listing.lines().filter(|l| !l.trim().is_empty()).count();
                if found >= expected {
                    Verification::Confirmed {
                        remote_entries: found,
                    }
                } else {
                    Verification::Mismatch { expected, found }
                }
            }
            Err(reason) => Verification::Unavailable { reason },
        }
    }

    async fn dispatch_host(&self, host: &str, files: &[PathBuf]) -> HostOutcome {
        tracing::info!("📡 {}: creating {}", host, self.settings.remote_dir);
        if let Err(message) = self.step(&self.mkdir_command(host)).await {
            tracing::error!("❌ {}: could not create remote directory: {}", host, message);
            return HostOutcome::Failed {
                host: host.to_string(),
                stage: DispatchStage::CreateDir,
                message,
            };
        }

        tracing::info!("📦 {}: copying {} files", host, files.len());
        if let Err(message) = self.step(&self.copy_command(host, files)).await {
            tracing::error!("❌ {}: copy failed: {}", host, message);
            return HostOutcome::Failed {
                host: host.to_string(),
                stage: DispatchStage::Copy,
                message,
            };
        }

        let verification = self.verify(host, files.len()).await;
        match &verification {
            Verification::Confirmed { remote_entries } => {
                tracing::info!("✅ {}: {} entries present", host, remote_entries)
            }
            Verification::Mismatch { expected, found } => tracing::warn!(
                "⚠️  {}: expected at least {} files, remote lists {}",
                host,
                expected,
                found
            ),
            Verification::Unavailable { reason } => {
                tracing::warn!("⚠️  {}: could not verify copy: {}", host, reason)
            }
        }

        HostOutcome::Delivered {
            host: host.to_string(),
            files: files.len(),
            verification,
        }
    }

    /// Dispatches to every host in order. One host's failure never stops the next.
    pub async fn run(&self) -> Result<DispatchReport> {
        let files = collect_local_files(&self.settings.local_dir)?;
        tracing::info!(
            "Dispatching {} files from {} to {} hosts",
            files.len(),
            self.settings.local_dir.display(),
            self.settings.hosts.len()
        );

        let mut outcomes = Vec::with_capacity(self.settings.hosts.len());
        for host in &self.settings.hosts {
            outcomes.push(self.dispatch_host(host, &files).await);
        }

        let report = DispatchReport { outcomes };
        tracing::info!(
            "Dispatch finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        Ok(report)
    }
}
