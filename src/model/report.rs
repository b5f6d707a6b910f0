use serde::{Deserialize, Serialize};

/// A single published security notice about a vulnerability.
///
/// Identified by a reference link and/or a CVE number; not every advisory
/// carries both. `title` and `severity` are descriptive payload from the
/// crawler and pass through filtering unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cve: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl Advisory {
    pub fn new(link: Option<String>, cve: Option<String>) -> Self {
        Self {
            link,
            cve,
            title: None,
            severity: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }
}

/// The advisories affecting one specific dependency in the lock file.
///
/// A finding with zero advisories is not a valid report entry; filtering
/// drops such findings entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFinding {
    /// Name of the affected dependency, as reported by the crawler.
    pub package: String,
    /// Resolved version pinned in the lock file, when the crawler reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub advisories: Vec<Advisory>,
}

impl PackageFinding {
    pub fn new(package: impl Into<String>, advisories: Vec<Advisory>) -> Self {
        Self {
            package: package.into(),
            version: None,
            advisories,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// A vulnerability report for one lock file.
///
/// `count` is derived: it always equals `entries.len()`, i.e. the number of
/// distinct affected packages (not the number of individual advisories).
/// The only way to build a report is through [`VulnerabilityReport::new`],
/// which computes the count, so the invariant cannot drift. Entry order
/// follows crawler output and is preserved by filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VulnerabilityReport {
    count: usize,
    entries: Vec<PackageFinding>,
}

impl VulnerabilityReport {
    pub fn new(entries: Vec<PackageFinding>) -> Self {
        Self {
            count: entries.len(),
            entries,
        }
    }

    /// Number of affected packages in the report.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn entries(&self) -> &[PackageFinding] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<PackageFinding> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Deserialization re-derives the count instead of trusting a serialized one.
impl<'de> Deserialize<'de> for VulnerabilityReport {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            entries: Vec<PackageFinding>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(VulnerabilityReport::new(raw.entries))
    }
}
