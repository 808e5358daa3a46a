pub mod cleanup;
pub mod dispatch;
pub mod engine;
pub mod expiry;
pub mod issuance;
pub mod materialize;

pub use crate::domain::model::{CommandOutput, CommandSpec, DispatchReport, DomainList, RenewalDecision};
pub use crate::domain::ports::CommandRunner;
pub use crate::utils::error::Result;
