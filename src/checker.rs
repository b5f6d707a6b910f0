//! The security checker: lock-file resolution, advisory lookup, exclusion
//! filtering.
//!
//! [`SecurityChecker`] is the public entry point. It resolves the lock file
//! from the caller's path, asks a [`Crawler`] for the vulnerability report,
//! applies the exclusion config found next to the lock file (if any), and
//! hands back the filtered findings.
//!
//! # Example
//!
//! ```no_run
//! use lockscan::SecurityChecker;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut checker = SecurityChecker::new();
//!     let findings = checker.check("/path/to/project").await?;
//!
//!     println!(
//!         "{} affected packages",
//!         checker.last_vulnerability_count().unwrap_or(0)
//!     );
//!     for finding in findings {
//!         println!("{}: {} advisories", finding.package, finding.advisories.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::crawler::{default_crawler, Crawler};
use crate::error::{Error, Result};
use crate::exclusions::ExclusionSet;
use crate::filter::apply_exclusions;
use crate::model::PackageFinding;

/// Conventional lock file name looked up inside a directory argument.
const LOCK_FILE_NAME: &str = "composer.lock";

/// Manifest descriptor whose path maps to the lock file by substitution.
const MANIFEST_FILE_NAME: &str = "composer.json";

pub struct SecurityChecker {
    crawler: Box<dyn Crawler>,
    last_count: Option<usize>,
}

impl SecurityChecker {
    /// Creates a checker backed by the default HTTP crawler.
    pub fn new() -> Self {
        Self::with_crawler(Box::new(default_crawler()))
    }

    /// Creates a checker backed by a specific crawler.
    pub fn with_crawler(crawler: Box<dyn Crawler>) -> Self {
        Self {
            crawler,
            last_count: None,
        }
    }

    /// Checks a lock file for known vulnerabilities.
    ///
    /// `path` may be a project directory (the lock file is looked up inside
    /// it), a `composer.json` path (the sibling lock file is used), or the
    /// lock file itself. If a `securityChecker.json` exists next to the lock
    /// file, its exclusions are applied to the report before returning.
    ///
    /// # Errors
    ///
    /// - [`Error::LockFileNotFound`] if no lock file resolves to an existing file
    /// - [`Error::ConfigFormat`] if the exclusion config exists but is invalid
    /// - [`Error::Crawler`] / [`Error::DataIntegrity`] from the advisory lookup
    pub async fn check(&mut self, path: impl AsRef<Path>) -> Result<Vec<PackageFinding>> {
        let lock = resolve_lock_path(path.as_ref())?;

        let mut report = self.crawler.check(&lock).await?;

        if let Some(exclusions) = ExclusionSet::load_for_lock(&lock)? {
            report = apply_exclusions(report, &exclusions);
        }

        self.last_count = Some(report.count());
        Ok(report.into_entries())
    }

    /// Number of affected packages found by the most recent [`check`](Self::check),
    /// after exclusion filtering. `None` before the first check.
    pub fn last_vulnerability_count(&self) -> Option<usize> {
        self.last_count
    }

    pub fn crawler(&self) -> &dyn Crawler {
        self.crawler.as_ref()
    }
}

impl Default for SecurityChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the caller's path argument to the lock file.
///
/// A directory containing `composer.lock` resolves to that file; a path
/// ending in `composer.json` resolves to its sibling `composer.lock`; any
/// other path is taken as the lock file itself.
fn resolve_lock_path(path: &Path) -> Result<PathBuf> {
    let lock = if path.is_dir() && path.join(LOCK_FILE_NAME).is_file() {
        path.join(LOCK_FILE_NAME)
    } else if path.ends_with(MANIFEST_FILE_NAME) {
        path.with_file_name(LOCK_FILE_NAME)
    } else {
        path.to_path_buf()
    };

    if !lock.is_file() {
        return Err(Error::LockFileNotFound(lock));
    }

    Ok(lock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Advisory, VulnerabilityReport};
    use async_trait::async_trait;
    use std::fs;

    /// Crawler returning a canned report, standing in for the remote oracle.
    struct StubCrawler {
        report: VulnerabilityReport,
    }

    #[async_trait]
    impl Crawler for StubCrawler {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn check(&self, _lock: &Path) -> Result<VulnerabilityReport> {
            Ok(self.report.clone())
        }
    }

    fn advisory(link: Option<&str>, cve: Option<&str>) -> Advisory {
        Advisory::new(link.map(String::from), cve.map(String::from))
    }

    fn sample_report() -> VulnerabilityReport {
        VulnerabilityReport::new(vec![
            PackageFinding::new(
                "acme/widget",
                vec![
                    advisory(Some("https://example.com/a"), None),
                    advisory(None, Some("CVE-2020-1")),
                ],
            ),
            PackageFinding::new("acme/gadget", vec![advisory(None, Some("CVE-2020-2"))]),
        ])
    }

    fn checker_with(report: VulnerabilityReport) -> SecurityChecker {
        SecurityChecker::with_crawler(Box::new(StubCrawler { report }))
    }

    #[tokio::test]
    async fn test_check_without_exclusion_config() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("composer.lock");
        fs::write(&lock, "{}").unwrap();

        let mut checker = checker_with(sample_report());
        let findings = checker.check(&lock).await.unwrap();

        assert_eq!(findings.len(), 2);
        assert_eq!(checker.last_vulnerability_count(), Some(2));
    }

    #[tokio::test]
    async fn test_check_applies_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("composer.lock");
        fs::write(&lock, "{}").unwrap();
        fs::write(
            dir.path().join("securityChecker.json"),
            r#"{"exclusions": ["CVE-2020-2"]}"#,
        )
        .unwrap();

        let mut checker = checker_with(sample_report());
        let findings = checker.check(&lock).await.unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].package, "acme/widget");
        assert_eq!(checker.last_vulnerability_count(), Some(1));
    }

    #[tokio::test]
    async fn test_check_malformed_config_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("composer.lock");
        fs::write(&lock, "{}").unwrap();
        fs::write(
            dir.path().join("securityChecker.json"),
            r#"{"exclusions": "not-an-array"}"#,
        )
        .unwrap();

        let mut checker = checker_with(sample_report());
        let err = checker.check(&lock).await.unwrap_err();

        assert!(matches!(err, Error::ConfigFormat { .. }));
        // No partially-filtered result is recorded.
        assert_eq!(checker.last_vulnerability_count(), None);
    }

    #[tokio::test]
    async fn test_check_directory_argument() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("composer.lock"), "{}").unwrap();

        let mut checker = checker_with(sample_report());
        let findings = checker.check(dir.path()).await.unwrap();
        assert_eq!(findings.len(), 2);
    }

    #[tokio::test]
    async fn test_check_manifest_argument() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("composer.json"), "{}").unwrap();
        fs::write(dir.path().join("composer.lock"), "{}").unwrap();

        let mut checker = checker_with(sample_report());
        let findings = checker.check(dir.path().join("composer.json")).await.unwrap();
        assert_eq!(findings.len(), 2);
    }

    #[tokio::test]
    async fn test_check_missing_lock_file() {
        let dir = tempfile::tempdir().unwrap();

        let mut checker = checker_with(sample_report());
        let err = checker
            .check(dir.path().join("composer.lock"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LockFileNotFound(_)));
    }

    #[tokio::test]
    async fn test_check_manifest_without_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("composer.json"), "{}").unwrap();

        let mut checker = checker_with(sample_report());
        let err = checker
            .check(dir.path().join("composer.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LockFileNotFound(_)));
    }

    #[test]
    fn test_resolve_lock_path_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("deps.lock");
        fs::write(&lock, "{}").unwrap();

        assert_eq!(resolve_lock_path(&lock).unwrap(), lock);
    }

    #[test]
    fn test_resolve_lock_path_directory_without_lock() {
        let dir = tempfile::tempdir().unwrap();
        // A directory with no composer.lock is treated as the lock path
        // itself, which is not a file.
        let err = resolve_lock_path(dir.path()).unwrap_err();
        assert!(matches!(err, Error::LockFileNotFound(_)));
    }
}
