use crate::domain::model::{CommandOutput, CommandSpec};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Runs an external program to completion and reports how it exited.
///
/// A process that starts and exits non-zero is `Ok` with a failing status;
/// `Err` means the process could not be started at all.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;
}

#[async_trait]
impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        (**self).run(command).await
    }
}
