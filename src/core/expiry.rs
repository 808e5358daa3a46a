//! Expiry-driven renewal gate.
//!
//! Reads the leaf certificate's notAfter and compares the whole days left
//! against a threshold. An absent certificate always needs renewal; a
//! malformed one is an error rather than a silent renewal.

use crate::domain::model::{RenewalDecision, RenewalReason};
use crate::utils::error::{CertError, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

const SECONDS_PER_DAY: i64 = 86_400;

/// `NotRequired` only while more than `threshold` days remain.
pub fn decide(days_left: i64, threshold: u32) -> RenewalDecision {
    if days_left > i64::from(threshold) {
        RenewalDecision::NotRequired { days_left }
    } else {
        RenewalDecision::Required(RenewalReason::Expiring { days_left })
    }
}

/// Whole days between `now` and `not_after`, rounded toward negative infinity.
pub fn days_left(not_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (not_after - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Parses the first PEM block of `pem` as X.509 and returns its notAfter.
pub fn parse_not_after(pem: &[u8]) -> std::result::Result<DateTime<Utc>, String> {
    let (_, pem) = x509_parser::pem::parse_x509_pem(pem)
        .map_err(|e| format!("Failed to parse PEM: {}", e))?;

    let (_, cert) = x509_parser::parse_x509_certificate(&pem.contents)
        .map_err(|e| format!("Failed to parse certificate: {}", e))?;

    let timestamp = cert.validity().not_after.timestamp();
    DateTime::from_timestamp(timestamp, 0).ok_or_else(|| "Invalid expiry timestamp".to_string())
}

pub fn read_not_after(path: &Path) -> Result<DateTime<Utc>> {
    let pem = std::fs::read(path)?;
    parse_not_after(&pem).map_err(|reason| CertError::InvalidCertificate {
        path: path.to_path_buf(),
        reason,
    })
}

/// Gate decision for the certificate at `path`.
///
/// `force` short-circuits without reading the file.
pub fn check_expiry(
    path: &Path,
    threshold: u32,
    force: bool,
    now: DateTime<Utc>,
) -> Result<RenewalDecision> {
    if force {
        tracing::info!("⚡ Force mode: skipping expiry check");
        return Ok(RenewalDecision::Required(RenewalReason::Forced));
    }

    if !path.exists() {
        tracing::info!("No certificate at {}, first issuance", path.display());
        return Ok(RenewalDecision::Required(RenewalReason::Missing));
    }

    let not_after = read_not_after(path)?;
    let days = days_left(not_after, now);
    tracing::info!(
        "Certificate {} expires {} ({} days left, threshold {})",
        path.display(),
        not_after.format("%Y-%m-%d %H:%M:%S UTC"),
        days,
        threshold
    );

    Ok(decide(days, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_decide_required_iff_days_left_at_most_threshold() {
        for threshold in [0u32, 1, 7, 30, 90] {
            for days in -5i64..=120 {
                let decision = decide(days, threshold);
                assert_eq!(
                    decision.is_required(),
                    days <= i64::from(threshold),
                    "days_left={} threshold={}",
                    days,
                    threshold
                );
                assert_eq!(decision.days_left(), Some(days));
            }
        }
    }

    #[test]
    fn test_days_left_floors() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(days_left(now + Duration::days(30), now), 30);
        assert_eq!(days_left(now + Duration::days(30) - Duration::seconds(1), now), 29);
        assert_eq!(days_left(now + Duration::hours(23), now), 0);
        assert_eq!(days_left(now - Duration::hours(1), now), -1);
        assert_eq!(days_left(now - Duration::days(2), now), -2);
    }

    #[test]
    fn test_force_ignores_file() {
        let decision = check_expiry(Path::new("/definitely/not/here.pem"), 30, true, Utc::now()).unwrap();
        assert!(decision.is_forced());
    }

    #[test]
    fn test_missing_file_requires_renewal() {
        let dir = tempfile::tempdir().unwrap();
        let decision = check_expiry(&dir.path().join("cert.pem"), 0, false, Utc::now()).unwrap();
        assert_eq!(decision, RenewalDecision::Required(RenewalReason::Missing));
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cert.pem");
        std::fs::write(&path, "this is not a certificate").unwrap();

        let err = check_expiry(&path, 30, false, Utc::now()).unwrap_err();
        assert!(matches!(err, CertError::InvalidCertificate { .. }));
    }
}
