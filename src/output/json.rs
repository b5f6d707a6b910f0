use crate::model::VulnerabilityReport;
use anyhow::Result;

pub fn print_json(report: &VulnerabilityReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
