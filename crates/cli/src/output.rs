//! Terminal rendering.

use colored::{ColoredString, Colorize};
use llm_health_adapters::IntegrationInfo;
use llm_health_core::TestResult;

/// Listing format of the `discover` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListFormat {
    /// Aligned table.
    Table,
    /// JSON array.
    Json,
}

/// Score coloured by its High / Medium / Low band.
pub fn score(value: f64) -> ColoredString {
    let text = format!("{value:.2}");
    if value >= 0.8 {
        text.green()
    } else if value >= 0.5 {
        text.yellow()
    } else {
        text.red()
    }
}

fn flag(supported: bool) -> ColoredString {
    if supported {
        "yes".green()
    } else {
        "no".dimmed()
    }
}

/// Print registered integrations grouped by category.
pub fn print_integrations(infos: &[IntegrationInfo]) {
    println!("{}", "Discovered integrations".bold().cyan());
    println!("{}", "=".repeat(60));

    let mut current = None;
    for info in infos {
        if current != Some(info.category) {
            println!();
            println!("{}", info.category.to_string().bold());
            current = Some(info.category);
        }
        println!(
            "  {:<24} {:<10} {}",
            info.name,
            info.version,
            info.module.dimmed()
        );
    }

    println!();
    println!("Total: {}", infos.len());
}

/// Print one line per result with capability flags and score.
pub fn print_results(results: &[TestResult]) {
    println!(
        "{}",
        format!(
            "{:<24} {:>6}  {:<6} {:<6} {:<6} {:<6} {:>6} {:>8}",
            "Integration", "Score", "Tools", "Stream", "Schema", "Async", "Errors", "Warnings"
        )
        .bold()
    );
    println!("{}", "-".repeat(80));

    for result in results {
        println!(
            "{:<24} {:>6}  {:<6} {:<6} {:<6} {:<6} {:>6} {:>8}",
            result.integration_name,
            score(result.compatibility_score),
            flag(result.supports_tool_binding),
            flag(result.supports_streaming),
            flag(result.supports_structured_output),
            flag(result.supports_async),
            result.errors.len(),
            result.warnings.len(),
        );
    }
}

/// Print errors and warnings beneath the table.
pub fn print_issues(results: &[TestResult]) {
    for result in results {
        if result.errors.is_empty() && result.warnings.is_empty() {
            continue;
        }
        println!();
        println!("{}", result.integration_name.bold());
        for error in &result.errors {
            println!("  {} {}", "error:".red(), error);
        }
        for warning in &result.warnings {
            println!("  {} {}", "warning:".yellow(), warning);
        }
    }
}
