//! Advisory crawlers.
//!
//! A [`Crawler`] turns a lock file into a [`VulnerabilityReport`]. How the
//! advisory data is sourced (network service, local database) is the
//! crawler's business; the rest of lockscan only relies on the report
//! contract: the report's count equals its number of entries at hand-off.
//!
//! [`HttpCrawler`] is the default implementation, querying a remote check
//! endpoint over HTTPS.

mod http;

pub use http::HttpCrawler;

use crate::error::Result;
use crate::model::VulnerabilityReport;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait Crawler: Send + Sync {
    /// Returns the human-readable name of this crawler.
    fn name(&self) -> &'static str;

    /// Looks up known advisories for the dependencies pinned in `lock`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crawler`](crate::Error::Crawler) if the lookup
    /// itself fails, or [`Error::DataIntegrity`](crate::Error::DataIntegrity)
    /// if the response violates the report contract.
    async fn check(&self, lock: &Path) -> Result<VulnerabilityReport>;
}

pub fn default_crawler() -> HttpCrawler {
    HttpCrawler::new()
}
