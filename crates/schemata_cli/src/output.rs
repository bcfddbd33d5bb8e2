use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use schemata_core::ValidationReport;
use serde::Serialize;
use serde_json::json;

/// How reports are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable, colored
    Text,
    /// Flat list of errors with stats
    Json,
    /// Errors grouped by path
    Nested,
    /// JSON:API style error objects
    Jsonapi,
}

pub fn print_validation_report(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print_text_report(report);
            Ok(())
        }
        OutputFormat::Json => print_json(report),
        OutputFormat::Nested => print_json(&json!({
            "passed": report.passed,
            "errors": report.to_nested(),
        })),
        OutputFormat::Jsonapi => print_json(&json!({"errors": report.to_jsonapi()})),
    }
}

fn print_text_report(report: &ValidationReport) {
    println!("\n{}", "═".repeat(60));
    println!("{}", "  VALIDATION REPORT".bold());
    println!("{}", "═".repeat(60));

    if report.passed {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    if !report.errors.is_empty() {
        println!("\n{}", "Errors:".red().bold());
        for (i, error) in report.errors.iter().enumerate() {
            println!("  {}. {}", i + 1, error.to_string().red());
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  Total errors:  {}", report.errors.len());
    println!("  Nodes visited: {}", report.stats.nodes_visited);
    println!("  Rules checked: {}", report.stats.rules_evaluated);
    println!("  Duration:      {} ms", report.stats.duration_ms);
    println!("{}", "═".repeat(60));
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}
