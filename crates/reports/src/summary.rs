//! Aggregate statistics over test results.

use llm_health_core::TestResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Totals across a set of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of records.
    pub total_integrations: usize,
    /// Records with tool binding.
    pub bind_tools_support: usize,
    /// Records with streaming.
    pub streaming_support: usize,
    /// Records with structured output.
    pub structured_output_support: usize,
    /// Records with async invocation.
    pub async_support: usize,
    /// Mean compatibility score.
    pub average_compatibility_score: f64,
    /// Records with at least one error.
    pub integrations_with_errors: usize,
    /// Records with at least one warning.
    pub integrations_with_warnings: usize,
}

impl ReportSummary {
    /// Summarise `results`; `None` when empty.
    pub fn from_results(results: &[TestResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let count = |pred: fn(&TestResult) -> bool| results.iter().filter(|r| pred(r)).count();
        let total_score: f64 = results.iter().map(|r| r.compatibility_score).sum();

        Some(Self {
            total_integrations: results.len(),
            bind_tools_support: count(|r| r.supports_tool_binding),
            streaming_support: count(|r| r.supports_streaming),
            structured_output_support: count(|r| r.supports_structured_output),
            async_support: count(|r| r.supports_async),
            average_compatibility_score: total_score / results.len() as f64,
            integrations_with_errors: count(|r| !r.errors.is_empty()),
            integrations_with_warnings: count(|r| !r.warnings.is_empty()),
        })
    }

    /// Labelled rows for human-readable output.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Integrations", self.total_integrations.to_string()),
            ("Bind Tools Support", self.bind_tools_support.to_string()),
            ("Streaming Support", self.streaming_support.to_string()),
            (
                "Structured Output Support",
                self.structured_output_support.to_string(),
            ),
            ("Async Support", self.async_support.to_string()),
            (
                "Average Compatibility Score",
                format!("{:.2}", self.average_compatibility_score),
            ),
            (
                "Integrations With Errors",
                self.integrations_with_errors.to_string(),
            ),
            (
                "Integrations With Warnings",
                self.integrations_with_warnings.to_string(),
            ),
        ]
    }
}

/// One row of the compatibility matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixEntry {
    /// Tool binding works.
    pub bind_tools: bool,
    /// Streaming works.
    pub streaming: bool,
    /// Structured output works.
    pub structured_output: bool,
    /// Async invocation works.
    #[serde(rename = "async")]
    pub async_support: bool,
    /// Compatibility score.
    pub compatibility_score: f64,
}

impl From<&TestResult> for MatrixEntry {
    fn from(result: &TestResult) -> Self {
        Self {
            bind_tools: result.supports_tool_binding,
            streaming: result.supports_streaming,
            structured_output: result.supports_structured_output,
            async_support: result.supports_async,
            compatibility_score: result.compatibility_score,
        }
    }
}

/// Matrix keyed by integration name. Later records for a name replace
/// earlier ones.
pub fn compatibility_matrix(results: &[TestResult]) -> BTreeMap<String, MatrixEntry> {
    results
        .iter()
        .map(|r| (r.integration_name.clone(), MatrixEntry::from(r)))
        .collect()
}
