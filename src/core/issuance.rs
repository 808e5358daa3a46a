use crate::config::RenewalSettings;
use crate::domain::model::{CommandSpec, DomainList};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{CertError, Result};
use std::path::Path;

/// Fails unless the credentials file exists. Loose permissions only warn.
pub fn check_credentials(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(CertError::MissingFile {
            what: "credentials file".to_string(),
            path: path.to_path_buf(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            tracing::warn!(
                "⚠️  Credentials file {} has mode {:o}, should be 0600 or 0400",
                path.display(),
                mode
            );
        }
    }

    Ok(())
}

/// Non-interactive DNS-01 `certonly` invocation for every listed domain.
pub fn build_command(settings: &RenewalSettings, domains: &DomainList, force: bool) -> CommandSpec {
    let plugin = &settings.dns_plugin;
    let mut command = CommandSpec::new(&settings.client_bin)
        .args(["certonly", "--non-interactive", "--agree-tos"])
        .arg("--email")
        .arg(&settings.email)
        .arg(format!("--dns-{}", plugin))
        .arg(format!("--dns-{}-credentials", plugin))
        .arg(settings.credentials_file.to_string_lossy());

    if let Some(seconds) = settings.propagation_seconds {
        command = command
            .arg(format!("--dns-{}-propagation-seconds", plugin))
            .arg(seconds.to_string());
    }

    command = command
        .arg("--cert-name")
        .arg(&settings.primary_domain)
        .args(domains.to_args());

    if force {
        command = command.arg("--force-renewal");
    }

    command
}

/// Runs the issuance client once. Only the exit status decides success.
pub async fn issue<R: CommandRunner>(runner: &R, command: &CommandSpec) -> Result<()> {
    tracing::info!("🔐 Requesting certificate: {}", command);

    let output = runner.run(command).await?;
    for line in output.stdout.lines().chain(output.stderr.lines()) {
        tracing::debug!("[{}] {}", command.program, line);
    }

    output.into_result(&command.program)?;
    tracing::info!("✅ Issuance client finished successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings() -> RenewalSettings {
        RenewalSettings {
            credentials_file: PathBuf::from("/secrets/cf.ini"),
            ..RenewalSettings::default()
        }
    }

    #[test]
    fn test_command_lists_each_domain() {
        let domains = DomainList::parse("example.com\n# skip\n\nwww.example.com\n");
        let cmd = build_command(&settings(), &domains, false);

        assert_eq!(cmd.program, "certbot");
        assert_eq!(
            cmd.args,
            vec![
                "certonly",
                "--non-interactive",
                "--agree-tos",
                "--email",
                "admin@example.com",
                "--dns-cloudflare",
                "--dns-cloudflare-credentials",
                "/secrets/cf.ini",
                "--cert-name",
                "example.com",
                "-d",
                "example.com",
                "-d",
                "www.example.com",
            ]
        );
        assert!(!cmd.has_arg("--force-renewal"));
    }

    #[test]
    fn test_force_and_propagation_flags() {
        let mut settings = settings();
        settings.propagation_seconds = Some(90);
        let domains = DomainList::parse("example.com\n");
        let cmd = build_command(&settings, &domains, true);

        assert!(cmd.has_arg("--force-renewal"));
        let pos = cmd
            .args
            .iter()
            .position(|a| a == "--dns-cloudflare-propagation-seconds")
            .unwrap();
        assert_eq!(cmd.args[pos + 1], "90");
    }

    #[test]
    fn test_missing_credentials_is_fatal() {
        let err = check_credentials(Path::new("/nonexistent/cf.ini")).unwrap_err();
        assert!(matches!(err, CertError::MissingFile { .. }));
    }
}
