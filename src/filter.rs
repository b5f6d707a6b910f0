//! Exclusion filtering over vulnerability reports.
//!
//! [`apply_exclusions`] is the core of lockscan: it removes excluded
//! advisories from a report, drops findings left with no advisories, and
//! recomputes the affected-package count. It is a pure function over owned
//! data with no I/O; the new report is built by filtering into fresh
//! sequences rather than removing from the input while iterating it.

use crate::exclusions::ExclusionSet;
use crate::model::{PackageFinding, VulnerabilityReport};

/// Applies an exclusion set to a report.
///
/// An advisory is removed when its `link` or `cve` exactly equals any
/// identifier in the set; a finding whose advisories are all removed is
/// dropped from the report. Relative order of surviving findings and
/// advisories is preserved, and the returned report's count equals its
/// number of entries.
///
/// An empty exclusion set returns the input unchanged.
///
/// # Example
///
/// ```
/// use lockscan::{apply_exclusions, Advisory, ExclusionSet, PackageFinding, VulnerabilityReport};
///
/// let report = VulnerabilityReport::new(vec![PackageFinding::new(
///     "acme/widget",
///     vec![Advisory::new(None, Some("CVE-2020-1".to_string()))],
/// )]);
/// let exclusions: ExclusionSet = ["CVE-2020-1"].into_iter().collect();
///
/// let filtered = apply_exclusions(report, &exclusions);
/// assert_eq!(filtered.count(), 0);
/// ```
pub fn apply_exclusions(
    report: VulnerabilityReport,
    exclusions: &ExclusionSet,
) -> VulnerabilityReport {
    if exclusions.is_empty() {
        return report;
    }

    let entries: Vec<PackageFinding> = report
        .into_entries()
        .into_iter()
        .filter_map(|finding| {
            let PackageFinding {
                package,
                version,
                advisories,
            } = finding;

            let advisories: Vec<_> = advisories
                .into_iter()
                .filter(|advisory| !exclusions.matches(advisory))
                .collect();

            if advisories.is_empty() {
                tracing::debug!(package = %package, "all advisories excluded, dropping finding");
                None
            } else {
                Some(PackageFinding {
                    package,
                    version,
                    advisories,
                })
            }
        })
        .collect();

    VulnerabilityReport::new(entries)
}
