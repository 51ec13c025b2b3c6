//! Validate command: check an exported report document against the schema.

use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::PathBuf;

use kensa_engine::{validate, Severity};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(short, long)]
    pub verbose: bool,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read {:?}: {}", args.input, e))?;

    match validate(&content) {
        Ok(report) => {
            println!("{}", "✅ VALID".bright_green().bold());
            println!(
                "   Overall risk {:.0}/100, {} vulnerabilities",
                report.overall_risk_score,
                report.vulnerabilities.len()
            );

            if args.verbose {
                for severity in [
                    Severity::Critical,
                    Severity::High,
                    Severity::Medium,
                    Severity::Low,
                ] {
                    let count = report.count_at(severity);
                    if count > 0 {
                        println!("   - {}: {}", severity.badge(), count);
                    }
                }
                for vulnerability in report.by_severity() {
                    println!(
                        "   {} {} ({})",
                        vulnerability.severity.badge(),
                        vulnerability.title,
                        vulnerability.id
                    );
                }
            }

            Ok(())
        }
        Err(e) => {
            println!("{}", "❌ INVALID".bright_red().bold());
            println!("\n{}", "Validation error:".bright_red());
            println!("{}", e);
            if let Some(index) = e.offending_index() {
                println!("(vulnerability entry {})", index);
            }
            Err(anyhow::anyhow!("Report validation failed"))
        }
    }
}
