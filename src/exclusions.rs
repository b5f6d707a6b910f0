//! Exclusion list loading and matching.
//!
//! Callers can suppress known advisories by placing a `securityChecker.json`
//! file next to the lock file:
//!
//! ```json
//! {
//!     "exclusions": [
//!         "CVE-2020-1234",
//!         "https://symfony.com/cve-2020-5678"
//!     ]
//! }
//! ```
//!
//! Each exclusion is an untyped identifier checked against both an advisory's
//! `link` and its `cve` field; callers freely mix both kinds in one list.
//!
//! A missing config file means "no exclusions". A config file that exists but
//! does not parse, or whose `exclusions` field is not an array of strings, is
//! a hard error: a caller who wrote the config expects it to be honored, so
//! the check aborts rather than proceeding unfiltered.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::Advisory;

/// File name of the exclusion config, resolved next to the lock file.
pub const CONFIG_FILE_NAME: &str = "securityChecker.json";

/// An immutable set of advisory identifiers to suppress.
///
/// Identifiers are exact strings; no glob or prefix matching is performed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    identifiers: HashSet<String>,
}

#[derive(Deserialize)]
struct ExclusionConfig {
    // Absent key -> empty list; a present key of the wrong shape fails
    // deserialization, which the loader reports as a config format error.
    #[serde(default)]
    exclusions: Vec<String>,
}

impl ExclusionSet {
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    /// Returns true if the advisory's `link` or `cve` equals any identifier
    /// in the set. An advisory with neither field set never matches.
    pub fn matches(&self, advisory: &Advisory) -> bool {
        advisory
            .link
            .as_deref()
            .is_some_and(|link| self.identifiers.contains(link))
            || advisory
                .cve
                .as_deref()
                .is_some_and(|cve| self.identifiers.contains(cve))
    }

    /// Returns the conventional config path for a lock file: the same
    /// directory, file name replaced with `securityChecker.json`.
    pub fn config_path_for(lock: &Path) -> PathBuf {
        lock.with_file_name(CONFIG_FILE_NAME)
    }

    /// Loads the exclusion set associated with a lock file.
    ///
    /// Returns `None` when no config file exists next to the lock file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigFormat`] if the config file exists but is not
    /// valid JSON or its `exclusions` field is not an array of strings.
    pub fn load_for_lock(lock: &Path) -> Result<Option<Self>> {
        let path = Self::config_path_for(lock);
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }

    /// Loads an exclusion set from an explicit config path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;

        let config: ExclusionConfig =
            serde_json::from_str(&content).map_err(|e| Error::ConfigFormat {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            path = %path.display(),
            exclusions = config.exclusions.len(),
            "loaded exclusion config"
        );

        Ok(config.exclusions.into_iter().collect())
    }
}

impl FromIterator<String> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            identifiers: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn advisory(link: Option<&str>, cve: Option<&str>) -> Advisory {
        Advisory::new(link.map(String::from), cve.map(String::from))
    }

    #[test]
    fn test_matches_link() {
        let set: ExclusionSet = ["https://example.com/a"].into_iter().collect();

        assert!(set.matches(&advisory(Some("https://example.com/a"), None)));
        assert!(!set.matches(&advisory(Some("https://example.com/b"), None)));
    }

    #[test]
    fn test_matches_cve() {
        let set: ExclusionSet = ["CVE-2020-1"].into_iter().collect();

        assert!(set.matches(&advisory(None, Some("CVE-2020-1"))));
        assert!(!set.matches(&advisory(None, Some("CVE-2020-2"))));
    }

    #[test]
    fn test_identifier_checked_against_both_fields() {
        // A single untyped identifier matches whichever field carries it.
        let set: ExclusionSet = ["CVE-2020-1"].into_iter().collect();

        assert!(set.matches(&advisory(Some("CVE-2020-1"), None)));
        assert!(set.matches(&advisory(None, Some("CVE-2020-1"))));
    }

    #[test]
    fn test_advisory_without_identifiers_never_matches() {
        let set: ExclusionSet = ["CVE-2020-1", "https://example.com/a"]
            .into_iter()
            .collect();

        assert!(!set.matches(&advisory(None, None)));
    }

    #[test]
    fn test_config_path_convention() {
        let path = ExclusionSet::config_path_for(Path::new("/app/composer.lock"));
        assert_eq!(path, Path::new("/app/securityChecker.json"));
    }

    #[test]
    fn test_load_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"exclusions": ["CVE-2020-1", "https://x.test/a"]}"#).unwrap();

        let set = ExclusionSet::load(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("CVE-2020-1"));
        assert!(set.contains("https://x.test/a"));
    }

    #[test]
    fn test_load_missing_exclusions_key_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{}"#).unwrap();

        let set = ExclusionSet::load(&path).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_load_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "not json at all").unwrap();

        let err = ExclusionSet::load(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigFormat { .. }));
    }

    #[test]
    fn test_load_wrong_shape_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"exclusions": "not-an-array"}"#).unwrap();

        let err = ExclusionSet::load(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigFormat { .. }));
    }

    #[test]
    fn test_load_for_lock_absent_config() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("composer.lock");
        fs::write(&lock, "{}").unwrap();

        assert!(ExclusionSet::load_for_lock(&lock).unwrap().is_none());
    }

    #[test]
    fn test_load_for_lock_present_config() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("composer.lock");
        fs::write(&lock, "{}").unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"exclusions": ["CVE-2020-1"]}"#,
        )
        .unwrap();

        let set = ExclusionSet::load_for_lock(&lock).unwrap().unwrap();
        assert!(set.contains("CVE-2020-1"));
    }
}
