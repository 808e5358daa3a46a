//! Pre-renewal cleanup of the issuance client's per-domain state.
//!
//! The client numbers duplicate lineages `<domain>-0001`, `<domain>-0002`...
//! Once more than one exists (or on a forced run) every lineage of the
//! primary domain is removed so the next issuance starts clean.

use regex::Regex;
use std::path::{Path, PathBuf};

/// The three state locations under the client's state root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    pub live: PathBuf,
    pub archive: PathBuf,
    pub renewal: PathBuf,
}

impl StateLayout {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            live: state_dir.join("live"),
            archive: state_dir.join("archive"),
            renewal: state_dir.join("renewal"),
        }
    }
}

struct LineageMatcher {
    dir_re: Regex,
    conf_re: Regex,
}

impl LineageMatcher {
    fn new(domain: &str) -> Self {
        let escaped = regex::escape(domain);
        // Both patterns are built from an escaped literal and cannot fail.
        Self {
            dir_re: Regex::new(&format!(r"^{}(-\d+)?$", escaped)).unwrap(),
            conf_re: Regex::new(&format!(r"^{}(-\d+)?\.conf$", escaped)).unwrap(),
        }
    }
}

fn matching_entries(dir: &Path, re: &Regex) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_str().is_some_and(|name| re.is_match(name)))
        .map(|entry| entry.path())
        .collect();
    matches.sort();
    matches
}

/// Lineage directories for `domain` under `live/`. An absent `live/` counts as zero.
pub fn count_lineages(layout: &StateLayout, domain: &str) -> usize {
    let matcher = LineageMatcher::new(domain);
    matching_entries(&layout.live, &matcher.dir_re)
        .iter()
        .filter(|p| p.is_dir())
        .count()
}

pub fn should_clean(force: bool, lineage_count: usize) -> bool {
    force || lineage_count > 1
}

/// Every path [`clean`] would remove, in live, archive, renewal order.
pub fn plan(layout: &StateLayout, domain: &str) -> Vec<PathBuf> {
    let matcher = LineageMatcher::new(domain);
    let mut paths = matching_entries(&layout.live, &matcher.dir_re);
    paths.extend(matching_entries(&layout.archive, &matcher.dir_re));
    paths.extend(matching_entries(&layout.renewal, &matcher.conf_re));
    paths
}

/// Removes all state for `domain`. Failures are logged and skipped.
pub fn clean(layout: &StateLayout, domain: &str) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    for path in plan(layout, domain) {
        let result = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        match result {
            Ok(()) => {
                tracing::info!("🧹 Removed {}", path.display());
                removed.push(path);
            }
            Err(e) => tracing::warn!("Could not remove {}: {}", path.display(), e),
        }
    }
    removed
}
