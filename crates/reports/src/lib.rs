//! Compatibility reports for LLM integration test results.
//!
//! This crate renders a set of [`TestResult`] records as JSON, CSV or
//! Markdown, and writes the rendered report to disk.
//!
//! # Quick Start
//!
//! ```no_run
//! use llm_health_core::TestResult;
//! use llm_health_reports::{CompatibilityReporter, ReportFormat};
//!
//! let results = vec![TestResult::new("MockLLM", Some("0.1.0"))];
//! let reporter = CompatibilityReporter::new(&results);
//!
//! println!("{}", reporter.markdown_report());
//! reporter.save_report(ReportFormat::Json, "report.json").unwrap();
//! ```
//!
//! # Modules
//!
//! - [`summary`] - Aggregate statistics and the compatibility matrix
//! - [`csv`] - CSV rendering
//! - [`markdown`] - Markdown rendering
//! - [`io`] - Writing reports to disk

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod csv;
pub mod error;
pub mod io;
pub mod markdown;
pub mod summary;

pub use error::{ReportError, Result};
pub use summary::{MatrixEntry, ReportSummary};

use chrono::Utc;
use llm_health_core::TestResult;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Placeholder emitted when there is nothing to report.
pub const NO_RESULTS: &str = "No test results available";

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Pretty-printed JSON document.
    Json,
    /// One CSV row per record.
    Csv,
    /// Human-readable Markdown.
    Markdown,
}

impl ReportFormat {
    /// Infer the format from a file extension, if recognised.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?;
        extension.parse().ok()
    }

    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Markdown => "md",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "md" | "markdown" => Ok(Self::Markdown),
            other => Err(ReportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Renders reports over a borrowed set of records.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityReporter<'a> {
    results: &'a [TestResult],
}

impl<'a> CompatibilityReporter<'a> {
    /// Create a reporter over `results`.
    pub fn new(results: &'a [TestResult]) -> Self {
        Self { results }
    }

    /// Records being reported on.
    pub fn results(&self) -> &'a [TestResult] {
        self.results
    }

    /// Aggregate statistics, or `None` when there are no records.
    pub fn summary(&self) -> Option<ReportSummary> {
        ReportSummary::from_results(self.results)
    }

    /// Capability flags and score per integration name.
    pub fn compatibility_matrix(&self) -> BTreeMap<String, MatrixEntry> {
        summary::compatibility_matrix(self.results)
    }

    /// Full report as pretty-printed JSON.
    pub fn json_report(&self) -> Result<String> {
        let summary = match self.summary() {
            Some(summary) => serde_json::to_value(summary)?,
            None => serde_json::json!({ "message": NO_RESULTS }),
        };
        let report = serde_json::json!({
            "report_timestamp": Utc::now().to_rfc3339(),
            "total_integrations_tested": self.results.len(),
            "summary": summary,
            "compatibility_matrix": self.compatibility_matrix(),
            "detailed_results": self.results,
        });
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// One CSV row per record, or [`NO_RESULTS`] when empty.
    pub fn csv_report(&self) -> String {
        csv::generate_csv(self.results)
    }

    /// Markdown report with summary, matrix and per-record details.
    pub fn markdown_report(&self) -> String {
        markdown::generate_report(self.results)
    }

    /// Render in `format`.
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => self.json_report(),
            ReportFormat::Csv => Ok(self.csv_report()),
            ReportFormat::Markdown => Ok(self.markdown_report()),
        }
    }

    /// Render in `format` and write to `path`.
    pub fn save_report(&self, format: ReportFormat, path: impl AsRef<Path>) -> Result<()> {
        io::write_report(&self.render(format)?, path)
    }
}
