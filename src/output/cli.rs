use crate::model::VulnerabilityReport;
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct AdvisoryRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "CVE")]
    cve: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Link")]
    link: String,
}

pub fn print_cli_table(report: &VulnerabilityReport) -> Result<()> {
    println!();

    if report.is_empty() {
        println!("No known vulnerabilities found.");
        return Ok(());
    }

    println!("{} packages have known vulnerabilities:", report.count());
    println!();

    let rows: Vec<AdvisoryRow> = report
        .entries()
        .iter()
        .flat_map(|finding| {
            finding.advisories.iter().map(|advisory| AdvisoryRow {
                package: finding.package.clone(),
                version: finding
                    .version
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
                cve: advisory.cve.clone().unwrap_or_else(|| "-".to_string()),
                title: truncate(advisory.title.as_deref().unwrap_or("-"), 60),
                link: advisory.link.clone().unwrap_or_else(|| "-".to_string()),
            })
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_long_string() {
        let long = "a".repeat(80);
        let out = truncate(&long, 60);
        assert_eq!(out.chars().count(), 60);
        assert!(out.ends_with("..."));
    }
}
