use crate::utils::error::{CertError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn dns_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}$")
            .expect("static DNS name pattern")
    })
}

pub fn validate_path(field_name: &str, path: &Path) -> Result<()> {
    let raw = path.to_string_lossy();
    if raw.is_empty() {
        return Err(CertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: raw.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if raw.contains('\0') {
        return Err(CertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: raw.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_absolute_path(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, Path::new(path))?;
    if !path.starts_with('/') {
        return Err(CertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path must be absolute".to_string(),
        });
    }
    Ok(())
}

/// Exact DNS name, no `*.` wildcard label.
pub fn validate_domain_name(field_name: &str, domain: &str) -> Result<()> {
    if domain.len() > 253 || !dns_name_regex().is_match(domain) {
        return Err(CertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: domain.to_string(),
            reason: "Not a valid DNS name".to_string(),
        });
    }
    Ok(())
}

/// A bare file name: no directory components, not `.` or `..`.
pub fn validate_file_name(field_name: &str, name: &str) -> Result<()> {
    validate_non_empty_string(field_name, name)?;
    if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
        return Err(CertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Must be a plain file name without path separators".to_string(),
        });
    }
    Ok(())
}

/// Rejects characters that would break out of a single-quoted remote shell word.
pub fn validate_shell_quotable(field_name: &str, value: &str) -> Result<()> {
    if value.contains(['\'', '\n', '\r']) {
        return Err(CertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Must not contain quotes or line breaks".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_list(field_name: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(CertError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    for value in values {
        validate_non_empty_string(field_name, value)?;
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain_name() {
        assert!(validate_domain_name("primary_domain", "example.com").is_ok());
        assert!(validate_domain_name("primary_domain", "*.example.com").is_err());
        assert!(validate_domain_name("primary_domain", "a-b.c.example.org").is_ok());
        assert!(validate_domain_name("primary_domain", "").is_err());
        assert!(validate_domain_name("primary_domain", "localhost").is_err());
        assert!(validate_domain_name("primary_domain", "-bad.example.com").is_err());
        assert!(validate_domain_name("primary_domain", "bad domain.com").is_err());
    }

    #[test]
    fn test_validate_paths() {
        assert!(validate_path("output_dir", Path::new("certs")).is_ok());
        assert!(validate_path("output_dir", Path::new("")).is_err());
        assert!(validate_absolute_path("remote_dir", "/etc/ssl/private").is_ok());
        assert!(validate_absolute_path("remote_dir", "etc/ssl").is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("composite_file", "haproxy.pem").is_ok());
        assert!(validate_file_name("composite_file", "../x.pem").is_err());
        assert!(validate_file_name("composite_file", "sub/x.pem").is_err());
        assert!(validate_file_name("composite_file", "..").is_err());
        assert!(validate_file_name("composite_file", " ").is_err());
    }

    #[test]
    fn test_validate_shell_quotable() {
        assert!(validate_shell_quotable("remote_dir", "/etc/ssl/private/example.com").is_ok());
        assert!(validate_shell_quotable("remote_dir", "/etc/ssl/it's").is_err());
        assert!(validate_shell_quotable("remote_dir", "/tmp/a\nrm -rf /").is_err());
    }

    #[test]
    fn test_validate_range_and_lists() {
        assert!(validate_range("connect_timeout_secs", 10u64, 1, 300).is_ok());
        assert!(validate_range("connect_timeout_secs", 0u64, 1, 300).is_err());
        assert!(validate_non_empty_list("hosts", &["lb01".to_string()]).is_ok());
        assert!(validate_non_empty_list("hosts", &[]).is_err());
        assert!(validate_non_empty_list("hosts", &[" ".to_string()]).is_err());
    }
}
