//! Markdown output generation for compatibility reports.

use crate::summary::ReportSummary;
use crate::NO_RESULTS;
use llm_health_core::TestResult;
use std::fmt::{self, Write};

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn write_list(output: &mut String, heading: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(output, "**{heading}**:")?;
    writeln!(output)?;
    for item in items {
        writeln!(output, "- {item}")?;
    }
    writeln!(output)
}

fn write_report(output: &mut String, results: &[TestResult]) -> fmt::Result {
    writeln!(output, "# LLM Integration Compatibility Report")?;
    writeln!(
        output,
        "Generated on: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(output)?;
    writeln!(output, "## Summary")?;
    writeln!(output)?;

    match ReportSummary::from_results(results) {
        Some(summary) => {
            for (label, value) in summary.rows() {
                writeln!(output, "- **{label}**: {value}")?;
            }
        }
        None => writeln!(output, "- **Message**: {NO_RESULTS}")?,
    }

    writeln!(output)?;
    writeln!(output, "## Compatibility Matrix")?;
    writeln!(output)?;
    writeln!(
        output,
        "| Integration | Version | Score | Bind Tools | Streaming | Structured Output | Async |"
    )?;
    writeln!(
        output,
        "|-------------|---------|-------|------------|-----------|-------------------|-------|"
    )?;

    let mut ranked: Vec<&TestResult> = results.iter().collect();
    ranked.sort_by(|a, b| b.compatibility_score.total_cmp(&a.compatibility_score));
    for result in ranked {
        writeln!(
            output,
            "| {} | {} | {:.2} ({}) | {} | {} | {} | {} |",
            result.integration_name,
            result.integration_version,
            result.compatibility_score,
            result.score_label(),
            yes_no(result.supports_tool_binding),
            yes_no(result.supports_streaming),
            yes_no(result.supports_structured_output),
            yes_no(result.supports_async),
        )?;
    }

    writeln!(output)?;
    writeln!(output, "## Detailed Results")?;
    writeln!(output)?;

    for result in results {
        writeln!(output, "### {}", result.integration_name)?;
        writeln!(output, "**Version**: {}", result.integration_version)?;
        writeln!(
            output,
            "**Compatibility Score**: {:.2}",
            result.compatibility_score
        )?;
        writeln!(output)?;

        write_list(output, "Errors", &result.errors)?;
        write_list(output, "Warnings", &result.warnings)?;

        if !result.performance_metrics.is_empty() {
            writeln!(output, "**Performance Metrics**:")?;
            writeln!(output)?;
            for (metric, value) in &result.performance_metrics {
                writeln!(output, "- {metric}: {value}")?;
            }
            writeln!(output)?;
        }
    }

    Ok(())
}

/// Generate the Markdown compatibility report.
pub fn generate_report(results: &[TestResult]) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut output, results);
    output
}
