//! Core data types for advisories, findings, and vulnerability reports.
//!
//! This module contains the fundamental types used throughout lockscan:
//!
//! - [`Advisory`] - A single published security notice
//! - [`PackageFinding`] - The advisories affecting one dependency
//! - [`VulnerabilityReport`] - A complete report for one lock file
//!
//! # Example
//!
//! ```
//! use lockscan::{Advisory, PackageFinding, VulnerabilityReport};
//!
//! let advisory = Advisory::new(None, Some("CVE-2020-1".to_string()));
//! let finding = PackageFinding::new("symfony/http-kernel", vec![advisory]);
//! let report = VulnerabilityReport::new(vec![finding]);
//!
//! assert_eq!(report.count(), report.entries().len());
//! ```

mod report;

pub use report::*;
