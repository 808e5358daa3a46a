//! Copies the issued bundle out of the client's live state.
//!
//! Files are written in place with no temp-file + rename, so a concurrent
//! reader can observe a partially written composite file.

use crate::domain::model::BundleFile;
use crate::utils::error::{CertError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Creates or truncates `path` and writes `data`, owner read/write only.
pub fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.flush()?;

    // An existing file keeps its old mode through `open`.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

fn read_source(live_dir: &Path, file: BundleFile) -> Result<Vec<u8>> {
    let path = live_dir.join(file.file_name());
    if !path.exists() {
        return Err(CertError::MissingFile {
            what: format!("issued {}", file.file_name()),
            path,
        });
    }
    Ok(std::fs::read(&path)?)
}

/// Writes cert, chain, fullchain, privkey, then `composite_name` =
/// fullchain followed by privkey. Returns the written paths in that order.
pub fn materialize(live_dir: &Path, output_dir: &Path, composite_name: &str) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(BundleFile::ALL.len() + 1);
    let mut fullchain = Vec::new();
    let mut privkey = Vec::new();

    for file in BundleFile::ALL {
        let data = read_source(live_dir, file)?;
        let target = output_dir.join(file.file_name());
        write_private(&target, &data)?;
        tracing::debug!("Wrote {} ({} bytes)", target.display(), data.len());

        match file {
            BundleFile::FullChain => fullchain = data,
            BundleFile::PrivKey => privkey = data,
            BundleFile::Cert | BundleFile::Chain => {}
        }
        written.push(target);
    }

    let composite = output_dir.join(composite_name);
    let mut combined = fullchain;
    combined.extend_from_slice(&privkey);
    write_private(&composite, &combined)?;
    written.push(composite);

    tracing::info!("📁 Bundle written to {}", output_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn seed_live(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        for file in BundleFile::ALL {
            fs::write(dir.join(file.file_name()), format!("--{}--\n", file.file_name())).unwrap();
        }
    }

    #[test]
    fn test_composite_is_fullchain_then_key() {
        let root = tempfile::tempdir().unwrap();
        let live = root.path().join("live/example.com");
        let out = root.path().join("out/certs");
        seed_live(&live);

        let written = materialize(&live, &out, "haproxy.pem").unwrap();
        assert_eq!(written.len(), 5);
        assert_eq!(written[4], out.join("haproxy.pem"));

        let composite = fs::read(out.join("haproxy.pem")).unwrap();
        let mut expected = fs::read(out.join("fullchain.pem")).unwrap();
        expected.extend(fs::read(out.join("privkey.pem")).unwrap());
        assert_eq!(composite, expected);
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let live = root.path().join("live/example.com");
        seed_live(&live);
        fs::remove_file(live.join("chain.pem")).unwrap();

        let err = materialize(&live, &root.path().join("out"), "haproxy.pem").unwrap_err();
        assert!(matches!(err, CertError::MissingFile { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_file_is_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("privkey.pem");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_private(&path, b"new").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }
}
