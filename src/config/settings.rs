use crate::domain::model::BundleFile;
use crate::utils::error::{CertError, Result};
use crate::utils::validation::{
    validate_absolute_path, validate_domain_name, validate_file_name, validate_non_empty_list,
    validate_non_empty_string, validate_path, validate_range, validate_shell_quotable, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_PRIMARY_DOMAIN: &str = "example.com";
pub const DEFAULT_EMAIL: &str = "admin@example.com";
pub const DEFAULT_THRESHOLD_DAYS: u32 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Hosts that receive the bundle, in dispatch order.
pub const DEFAULT_HOSTS: [&str; 3] = ["lb01.example.com", "lb02.example.com", "mail.example.com"];

/// Everything one renewal run needs to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalSettings {
    pub primary_domain: String,
    pub email: String,
    pub threshold_days: u32,
    pub domains_file: PathBuf,
    pub credentials_file: PathBuf,
    pub output_dir: PathBuf,
    /// Name of the fullchain + key file inside `output_dir`.
    pub composite_file: String,
    /// Issuance client state root holding `live/`, `archive/` and `renewal/`.
    pub state_dir: PathBuf,
    pub client_bin: String,
    pub dns_plugin: String,
    pub propagation_seconds: Option<u32>,
}

impl Default for RenewalSettings {
    fn default() -> Self {
        Self {
            primary_domain: DEFAULT_PRIMARY_DOMAIN.to_string(),
            email: DEFAULT_EMAIL.to_string(),
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            domains_file: PathBuf::from("domains.txt"),
            credentials_file: PathBuf::from("cloudflare.ini"),
            output_dir: PathBuf::from("certs"),
            composite_file: "haproxy.pem".to_string(),
            state_dir: PathBuf::from("/etc/letsencrypt"),
            client_bin: "certbot".to_string(),
            dns_plugin: "cloudflare".to_string(),
            propagation_seconds: None,
        }
    }
}

impl RenewalSettings {
    /// The leaf certificate the expiry gate inspects.
    pub fn expiry_probe(&self) -> PathBuf {
        self.output_dir.join("cert.pem")
    }

    pub fn composite_path(&self) -> PathBuf {
        self.output_dir.join(&self.composite_file)
    }

    pub fn live_dir(&self) -> PathBuf {
        self.state_dir.join("live").join(&self.primary_domain)
    }
}

impl Validate for RenewalSettings {
    fn validate(&self) -> Result<()> {
        // Also the lineage name under live/, so no wildcard.
        validate_domain_name("renewal.primary_domain", &self.primary_domain)?;
        validate_non_empty_string("renewal.email", &self.email)?;
        validate_path("renewal.domains_file", &self.domains_file)?;
        validate_path("renewal.credentials_file", &self.credentials_file)?;
        validate_path("renewal.output_dir", &self.output_dir)?;
        validate_path("renewal.state_dir", &self.state_dir)?;
        validate_file_name("renewal.composite_file", &self.composite_file)?;
        if BundleFile::ALL
            .iter()
            .any(|file| file.file_name() == self.composite_file)
        {
            return Err(CertError::InvalidConfigValueError {
                field: "renewal.composite_file".to_string(),
                value: self.composite_file.clone(),
                reason: "Collides with one of the copied bundle files".to_string(),
            });
        }
        validate_non_empty_string("renewal.client_bin", &self.client_bin)?;
        validate_non_empty_string("renewal.dns_plugin", &self.dns_plugin)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSettings {
    pub hosts: Vec<String>,
    pub remote_user: Option<String>,
    pub local_dir: PathBuf,
    pub remote_dir: String,
    pub connect_timeout_secs: u64,
    pub ssh_bin: String,
    pub scp_bin: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            hosts: DEFAULT_HOSTS.iter().map(|h| h.to_string()).collect(),
            remote_user: Some("root".to_string()),
            local_dir: PathBuf::from("certs"),
            remote_dir: format!("/etc/ssl/private/{}", DEFAULT_PRIMARY_DOMAIN),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            ssh_bin: "ssh".to_string(),
            scp_bin: "scp".to_string(),
        }
    }
}

impl DispatchSettings {
    /// `user@host`, or the bare host when no user is configured.
    pub fn target(&self, host: &str) -> String {
        match self.remote_user.as_deref().filter(|u| !u.is_empty()) {
            Some(user) => format!("{}@{}", user, host),
            None => host.to_string(),
        }
    }

    /// Replaces the host list and re-validates.
    pub fn with_hosts(mut self, hosts: Vec<String>) -> Result<Self> {
        self.hosts = hosts;
        self.validate()?;
        Ok(self)
    }
}

impl Validate for DispatchSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_list("dispatch.hosts", &self.hosts)?;
        validate_path("dispatch.local_dir", &self.local_dir)?;
        validate_absolute_path("dispatch.remote_dir", &self.remote_dir)?;
        validate_shell_quotable("dispatch.remote_dir", &self.remote_dir)?;
        validate_range("dispatch.connect_timeout_secs", self.connect_timeout_secs, 1, 300)?;
        validate_non_empty_string("dispatch.ssh_bin", &self.ssh_bin)?;
        validate_non_empty_string("dispatch.scp_bin", &self.scp_bin)?;
        Ok(())
    }
}
