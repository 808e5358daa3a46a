use crate::domain::model::{CommandOutput, CommandSpec};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{CertError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Spawns real processes through `tokio::process`.
///
/// No timeout is applied here. Remote commands bound their connect phase
/// with `ConnectTimeout`; a stalled transfer blocks until interrupted.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!("Running: {}", command);

        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CertError::ToolSpawn {
                tool: command.program.clone(),
                source,
            })?;

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        tracing::debug!(
            "{} exited with {:?} ({} bytes stdout, {} bytes stderr)",
            command.program,
            result.status,
            result.stdout.len(),
            result.stderr.len()
        );

        Ok(result)
    }
}
