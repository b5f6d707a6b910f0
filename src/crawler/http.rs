use crate::error::{Error, Result};
use crate::model::{Advisory, PackageFinding, VulnerabilityReport};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tokio::fs;

/// Default advisory check endpoint.
const DEFAULT_ENDPOINT: &str = "https://security.symfony.com/check_lock";

/// Response header carrying the advisory count for the uploaded lock file.
const ALERTS_HEADER: &str = "X-Alerts";

const USER_AGENT: &str = concat!("lockscan/", env!("CARGO_PKG_VERSION"));

/// Crawler that uploads the lock file to a remote check endpoint.
///
/// The endpoint answers with the affected-package count in the `X-Alerts`
/// header and a JSON body keyed by package name:
///
/// ```json
/// {
///     "acme/widget": {
///         "version": "1.0.0",
///         "advisories": {
///             "acme/widget/CVE-2020-1.yaml": {
///                 "title": "RCE in widget renderer",
///                 "link": "https://example.com/cve-2020-1",
///                 "cve": "CVE-2020-1"
///             }
///         }
///     }
/// }
/// ```
pub struct HttpCrawler {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCrawler {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Creates a crawler against a non-default check endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpCrawler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::Crawler for HttpCrawler {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn check(&self, lock: &Path) -> Result<VulnerabilityReport> {
        let contents = fs::read(lock).await?;

        let file_name = lock
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "composer.lock".to_string());

        let form = reqwest::multipart::Form::new()
            .part("lock", reqwest::multipart::Part::bytes(contents).file_name(file_name));

        tracing::debug!(endpoint = %self.endpoint, lock = %lock.display(), "querying advisory endpoint");

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let count = parse_alerts_header(response.headers())?;
        let body = response.text().await?;

        let report = decode_report(&body)?;

        // The endpoint advertises its count out of band; a disagreement with
        // the decoded entries means the contract was violated upstream.
        if report.count() != count {
            return Err(Error::DataIntegrity(format!(
                "{} header says {} affected packages, body contains {}",
                ALERTS_HEADER,
                count,
                report.count()
            )));
        }

        Ok(report)
    }
}

fn parse_alerts_header(headers: &reqwest::header::HeaderMap) -> Result<usize> {
    let value = headers
        .get(ALERTS_HEADER)
        .ok_or_else(|| Error::DataIntegrity(format!("missing {} header", ALERTS_HEADER)))?;

    value
        .to_str()
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| {
            Error::DataIntegrity(format!("{} header is not a non-negative integer", ALERTS_HEADER))
        })
}

/// Decodes a check-endpoint response body into a report.
///
/// Entry order follows the order of packages in the body (`serde_json` is
/// built with `preserve_order`, so JSON object order survives decoding).
fn decode_report(body: &str) -> Result<VulnerabilityReport> {
    let findings: serde_json::Map<String, Value> = serde_json::from_str(body)
        .map_err(|e| Error::DataIntegrity(format!("response body is not a JSON object: {e}")))?;

    let mut entries = Vec::with_capacity(findings.len());
    for (package, value) in findings {
        entries.push(decode_finding(package, value)?);
    }

    Ok(VulnerabilityReport::new(entries))
}

fn decode_finding(package: String, value: Value) -> Result<PackageFinding> {
    let Value::Object(fields) = value else {
        return Err(Error::DataIntegrity(format!(
            "finding for {package} is not an object"
        )));
    };

    let version = fields
        .get("version")
        .and_then(Value::as_str)
        .map(String::from);

    // A finding without an advisories object is a contract violation, not
    // something to skip over.
    let advisories = match fields.get("advisories") {
        Some(Value::Object(advisories)) => advisories,
        Some(_) => {
            return Err(Error::DataIntegrity(format!(
                "advisories for {package} is not an object"
            )))
        }
        None => {
            return Err(Error::DataIntegrity(format!(
                "finding for {package} has no advisories"
            )))
        }
    };

    let advisories = advisories
        .values()
        .map(|advisory| decode_advisory(&package, advisory))
        .collect::<Result<Vec<_>>>()?;

    let mut finding = PackageFinding::new(package, advisories);
    if let Some(version) = version {
        finding = finding.with_version(version);
    }
    Ok(finding)
}

fn decode_advisory(package: &str, value: &Value) -> Result<Advisory> {
    let Value::Object(fields) = value else {
        return Err(Error::DataIntegrity(format!(
            "advisory for {package} is not an object"
        )));
    };

    let field = |name: &str| fields.get(name).and_then(Value::as_str).map(String::from);

    let mut advisory = Advisory::new(field("link"), field("cve"));
    advisory.title = field("title");
    advisory.severity = field("severity");
    Ok(advisory)
}
