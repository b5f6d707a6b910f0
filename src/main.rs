use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use lockscan::{
    crawler::HttpCrawler,
    output::{format_report_to_string, print_report, OutputFormat},
    SecurityChecker, VulnerabilityReport,
};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const VULNS_FOUND: u8 = 2;
}

#[derive(Parser)]
#[command(name = "lockscan")]
#[command(
    author,
    version,
    about = "Check a dependency lock file for known security vulnerabilities"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a lock file against the advisory database
    Check {
        /// Project directory, composer.json path, or lock file path
        path: String,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Write output to file
        #[arg(short, long)]
        output: Option<String>,

        /// Override the advisory check endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            path,
            format,
            output,
            endpoint,
        } => run_check(path, format, output, endpoint).await,
    }
}

async fn run_check(
    path: String,
    format: String,
    output_file: Option<String>,
    endpoint: Option<String>,
) -> Result<u8> {
    let format = OutputFormat::from_str(&format).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table && output_file.is_none();

    let mut checker = match endpoint {
        Some(endpoint) => {
            SecurityChecker::with_crawler(Box::new(HttpCrawler::with_endpoint(endpoint)))
        }
        None => SecurityChecker::new(),
    };

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Checking lock file for known vulnerabilities...");
        Some(pb)
    } else {
        None
    };

    let result = checker.check(&path).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let findings = result?;
    let count = checker.last_vulnerability_count().unwrap_or(0);
    let report = VulnerabilityReport::new(findings);

    if let Some(path) = output_file {
        let content = format_report_to_string(&report, format)?;
        std::fs::write(&path, content)?;
        println!("Results written to: {}", path);
    } else {
        print_report(&report, format)?;
    }

    if count > 0 {
        Ok(exit_codes::VULNS_FOUND)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}
