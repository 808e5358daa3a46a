use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertError {
    #[error("Required {what} not found: {}", .path.display())]
    MissingFile { what: String, path: PathBuf },

    #[error("No domains found in {}", .path.display())]
    NoDomains { path: PathBuf },

    #[error("Invalid certificate {}: {reason}", .path.display())]
    InvalidCertificate { path: PathBuf, reason: String },

    #[error("{tool} exited with {}: {stderr}", .status.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    ToolFailed {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Failed to start {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A required file, directory or domain entry is absent.
    Precondition,
    /// An external program failed or could not be started.
    ExternalTool,
    Configuration,
    Io,
}

impl CertError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CertError::MissingFile { .. }
            | CertError::NoDomains { .. }
            | CertError::InvalidCertificate { .. } => ErrorCategory::Precondition,
            CertError::ToolFailed { .. } | CertError::ToolSpawn { .. } => {
                ErrorCategory::ExternalTool
            }
            CertError::ConfigValidationError { .. }
            | CertError::InvalidConfigValueError { .. }
            | CertError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CertError::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CertError::MissingFile { what, path } => {
                format!("Create the {} at {} or point the configuration at it", what, path.display())
            }
            CertError::NoDomains { path } => format!(
                "Add at least one domain (one per line, '#' for comments) to {}",
                path.display()
            ),
            CertError::InvalidCertificate { path, .. } => format!(
                "Inspect {} with 'openssl x509 -noout -enddate' or rerun with --force to reissue",
                path.display()
            ),
            CertError::ToolFailed { tool, .. } => {
                format!("Check the {} output above and its own log files", tool)
            }
            CertError::ToolSpawn { tool, .. } => {
                format!("Make sure {} is installed and on PATH", tool)
            }
            CertError::IoError(_) => "Check file permissions and free disk space".to_string(),
            CertError::ConfigValidationError { .. }
            | CertError::InvalidConfigValueError { .. }
            | CertError::MissingConfigError { .. } => {
                "Fix the configuration file and try again".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Precondition => format!("Precondition failed: {}", self),
            ErrorCategory::ExternalTool => format!("External command failed: {}", self),
            ErrorCategory::Configuration => self.to_string(),
            ErrorCategory::Io => format!("Filesystem error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CertError>;
