use crate::utils::error::{CertError, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// The four PEM files the issuance client keeps under `live/<lineage>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleFile {
    Cert,
    Chain,
    FullChain,
    PrivKey,
}

impl BundleFile {
    /// Copy order used when materializing a bundle.
    pub const ALL: [BundleFile; 4] = [
        BundleFile::Cert,
        BundleFile::Chain,
        BundleFile::FullChain,
        BundleFile::PrivKey,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            BundleFile::Cert => "cert.pem",
            BundleFile::Chain => "chain.pem",
            BundleFile::FullChain => "fullchain.pem",
            BundleFile::PrivKey => "privkey.pem",
        }
    }
}

/// Ordered list of domains read from a plain-text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainList {
    domains: Vec<String>,
}

impl DomainList {
    /// One domain per line. Blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Self {
        let domains = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { domains }
    }

    /// Reads and parses the list; an absent file or an empty list is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CertError::MissingFile {
                what: "domain list".to_string(),
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let list = Self::parse(&content);
        if list.is_empty() {
            return Err(CertError::NoDomains {
                path: path.to_path_buf(),
            });
        }
        Ok(list)
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// `-d <domain>` pairs for the issuance client, in file order.
    pub fn to_args(&self) -> Vec<String> {
        self.domains
            .iter()
            .flat_map(|d| ["-d".to_string(), d.clone()])
            .collect()
    }
}

/// Why a renewal has to happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalReason {
    Forced,
    /// No certificate has been issued yet.
    Missing,
    Expiring { days_left: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalDecision {
    Required(RenewalReason),
    NotRequired { days_left: i64 },
}

impl RenewalDecision {
    pub fn is_required(&self) -> bool {
        matches!(self, RenewalDecision::Required(_))
    }

    pub fn is_forced(&self) -> bool {
        matches!(self, RenewalDecision::Required(RenewalReason::Forced))
    }

    /// Days remaining, when the certificate was actually inspected.
    pub fn days_left(&self) -> Option<i64> {
        match self {
            RenewalDecision::Required(RenewalReason::Expiring { days_left })
            | RenewalDecision::NotRequired { days_left } => Some(*days_left),
            RenewalDecision::Required(_) => None,
        }
    }
}

impl fmt::Display for RenewalDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenewalDecision::Required(RenewalReason::Forced) => write!(f, "renewal forced"),
            RenewalDecision::Required(RenewalReason::Missing) => {
                write!(f, "renewal required (no certificate yet)")
            }
            RenewalDecision::Required(RenewalReason::Expiring { days_left }) => {
                write!(f, "renewal required ({} days left)", days_left)
            }
            RenewalDecision::NotRequired { days_left } => {
                write!(f, "renewal not required ({} days left)", days_left)
            }
        }
    }
}

/// An external program invocation. Arguments are passed verbatim, no shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Converts a non-zero exit into [`CertError::ToolFailed`].
    pub fn into_result(self, tool: &str) -> Result<CommandOutput> {
        if self.success() {
            Ok(self)
        } else {
            Err(CertError::ToolFailed {
                tool: tool.to_string(),
                status: self.status,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Dispatch step a host failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStage {
    CreateDir,
    Copy,
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchStage::CreateDir => write!(f, "create remote directory"),
            DispatchStage::Copy => write!(f, "copy files"),
        }
    }
}

/// Best-effort post-copy check. Never changes a host's success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Verification {
    Confirmed { remote_entries: usize },
    Mismatch { expected: usize, found: usize },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HostOutcome {
    Delivered {
        host: String,
        files: usize,
        verification: Verification,
    },
    Failed {
        host: String,
        stage: DispatchStage,
        message: String,
    },
}

impl HostOutcome {
    pub fn host(&self) -> &str {
        match self {
            HostOutcome::Delivered { host, .. } | HostOutcome::Failed { host, .. } => host,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, HostOutcome::Delivered { .. })
    }
}

/// Ordered per-host results of one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub outcomes: Vec<HostOutcome>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    /// The run fails only when no host received the bundle.
    pub fn exit_code(&self) -> i32 {
        if self.succeeded() == 0 {
            1
        } else {
            0
        }
    }
}
