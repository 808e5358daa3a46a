use crate::config::settings::{DispatchSettings, RenewalSettings};
use crate::utils::error::{CertError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Optional overrides for the compiled-in settings. Every key may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub renewal: Option<RenewalSection>,
    pub dispatch: Option<DispatchSection>,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenewalSection {
    pub primary_domain: Option<String>,
    pub email: Option<String>,
    pub threshold_days: Option<u32>,
    pub domains_file: Option<PathBuf>,
    pub credentials_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub composite_file: Option<String>,
    pub state_dir: Option<PathBuf>,
    pub client_bin: Option<String>,
    pub dns_plugin: Option<String>,
    pub propagation_seconds: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchSection {
    pub hosts: Option<Vec<String>>,
    pub remote_user: Option<String>,
    pub local_dir: Option<PathBuf>,
    pub remote_dir: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub ssh_bin: Option<String>,
    pub scp_bin: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    pub file: Option<PathBuf>,
    pub format: Option<LogFormat>,
}

fn env_var_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap())
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CertError::MissingFile {
                what: "configuration file".to_string(),
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CertError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CF_API_TOKEN})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_regex()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Compiled-in defaults with this file's `[renewal]` keys applied, validated.
    pub fn renewal_settings(&self) -> Result<RenewalSettings> {
        let mut settings = RenewalSettings::default();
        if let Some(section) = &self.renewal {
            let s = section.clone();
            if let Some(v) = s.primary_domain {
                settings.primary_domain = v;
            }
            if let Some(v) = s.email {
                settings.email = v;
            }
            if let Some(v) = s.threshold_days {
                settings.threshold_days = v;
            }
            if let Some(v) = s.domains_file {
                settings.domains_file = v;
            }
            if let Some(v) = s.credentials_file {
                settings.credentials_file = v;
            }
            if let Some(v) = s.output_dir {
                settings.output_dir = v;
            }
            if let Some(v) = s.composite_file {
                settings.composite_file = v;
            }
            if let Some(v) = s.state_dir {
                settings.state_dir = v;
            }
            if let Some(v) = s.client_bin {
                settings.client_bin = v;
            }
            if let Some(v) = s.dns_plugin {
                settings.dns_plugin = v;
            }
            if s.propagation_seconds.is_some() {
                settings.propagation_seconds = s.propagation_seconds;
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Compiled-in defaults with this file's `[dispatch]` keys applied, validated.
    pub fn dispatch_settings(&self) -> Result<DispatchSettings> {
        let mut settings = DispatchSettings::default();
        if let Some(section) = &self.dispatch {
            let s = section.clone();
            if let Some(v) = s.hosts {
                settings.hosts = v;
            }
            if s.remote_user.is_some() {
                settings.remote_user = s.remote_user;
            }
            if let Some(v) = s.local_dir {
                settings.local_dir = v;
            }
            if let Some(v) = s.remote_dir {
                settings.remote_dir = v;
            }
            if let Some(v) = s.connect_timeout_secs {
                settings.connect_timeout_secs = v;
            }
            if let Some(v) = s.ssh_bin {
                settings.ssh_bin = v;
            }
            if let Some(v) = s.scp_bin {
                settings.scp_bin = v;
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.logging.as_ref().and_then(|l| l.file.as_deref())
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .as_ref()
            .and_then(|l| l.format)
            .unwrap_or_default()
    }
}

/// Loads the file when given, otherwise an empty config (pure defaults).
pub fn load_optional(path: Option<&Path>) -> Result<TomlConfig> {
    match path {
        Some(path) => TomlConfig::from_file(path),
        None => Ok(TomlConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_yields_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.renewal_settings().unwrap(), RenewalSettings::default());
        assert_eq!(config.dispatch_settings().unwrap(), DispatchSettings::default());
        assert_eq!(config.log_format(), LogFormat::Text);
        assert!(config.log_file().is_none());
    }

    #[test]
    fn test_parse_overrides() {
        let toml_content = r#"
[renewal]
primary_domain = "corp.example.net"
email = "ops@example.net"
threshold_days = 14
state_dir = "/srv/letsencrypt"
propagation_seconds = 60

[dispatch]
hosts = ["edge-a", "edge-b"]
remote_dir = "/etc/haproxy/certs"
connect_timeout_secs = 5

[logging]
file = "/var/log/cert-courier.log"
format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let renewal = config.renewal_settings().unwrap();
        assert_eq!(renewal.primary_domain, "corp.example.net");
        assert_eq!(renewal.threshold_days, 14);
        assert_eq!(renewal.state_dir, PathBuf::from("/srv/letsencrypt"));
        assert_eq!(renewal.propagation_seconds, Some(60));
        assert_eq!(renewal.client_bin, "certbot");

        let dispatch = config.dispatch_settings().unwrap();
        assert_eq!(dispatch.hosts, vec!["edge-a", "edge-b"]);
        assert_eq!(dispatch.connect_timeout_secs, 5);
        assert_eq!(dispatch.remote_user.as_deref(), Some("root"));

        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(
            config.log_file(),
            Some(Path::new("/var/log/cert-courier.log"))
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CERT_COURIER_TEST_EMAIL", "secops@example.org");

        let toml_content = r#"
[renewal]
email = "${CERT_COURIER_TEST_EMAIL}"
credentials_file = "${CERT_COURIER_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let renewal = config.renewal_settings().unwrap();
        assert_eq!(renewal.email, "secops@example.org");
        assert_eq!(
            renewal.credentials_file,
            PathBuf::from("${CERT_COURIER_UNSET_VAR}")
        );

        std::env::remove_var("CERT_COURIER_TEST_EMAIL");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = TomlConfig::from_toml_str("[renewal]\nprimary_domain = \"not a domain\"\n").unwrap();
        assert!(config.renewal_settings().is_err());

        let config = TomlConfig::from_toml_str("[renewal]\ncomposite_file = \"privkey.pem\"\n").unwrap();
        assert!(config.renewal_settings().is_err());

        let config = TomlConfig::from_toml_str("[renewal]\nprimary_domain = \"*.example.com\"\n").unwrap();
        assert!(config.renewal_settings().is_err());

        let config = TomlConfig::from_toml_str("[dispatch]\nhosts = []\n").unwrap();
        assert!(config.dispatch_settings().is_err());

        assert!(TomlConfig::from_toml_str("[renewal]\nthreshold_days = -3\n").is_err());
        assert!(TomlConfig::from_toml_str("[renewal]\nunknown_key = 1\n").is_err());
    }

    #[test]
    fn test_shipped_example_parses() {
        let config = TomlConfig::from_toml_str(include_str!("../../cert-courier.example.toml")).unwrap();
        assert_eq!(config.renewal_settings().unwrap(), RenewalSettings::default());
        assert_eq!(config.dispatch_settings().unwrap(), DispatchSettings::default());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[renewal]\nthreshold_days = 7\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.renewal_settings().unwrap().threshold_days, 7);

        let missing = TomlConfig::from_file("/nonexistent/cert-courier.toml").unwrap_err();
        assert!(matches!(missing, CertError::MissingFile { .. }));
    }
}
