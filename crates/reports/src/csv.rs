//! CSV output generation.

use crate::NO_RESULTS;
use llm_health_core::TestResult;

/// Column order of the CSV report.
pub const HEADERS: [&str; 12] = [
    "integration_name",
    "integration_version",
    "test_timestamp",
    "compatibility_score",
    "bind_tools_support",
    "streaming_support",
    "structured_output_support",
    "async_support",
    "error_count",
    "warning_count",
    "avg_invoke_latency",
    "avg_streaming_latency",
];

/// Quote a field when it contains a delimiter, quote or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn row(result: &TestResult) -> Vec<String> {
    let metric = |name: &str| {
        result
            .performance_metrics
            .get(name)
            .copied()
            .unwrap_or(0.0)
            .to_string()
    };
    vec![
        escape(&result.integration_name),
        escape(&result.integration_version),
        result.tested_at.to_rfc3339(),
        result.compatibility_score.to_string(),
        result.supports_tool_binding.to_string(),
        result.supports_streaming.to_string(),
        result.supports_structured_output.to_string(),
        result.supports_async.to_string(),
        result.errors.len().to_string(),
        result.warnings.len().to_string(),
        metric("invoke_latency"),
        metric("streaming_latency"),
    ]
}

/// Generate a CSV report, one row per record.
pub fn generate_csv(results: &[TestResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut output = HEADERS.join(",");
    output.push('\n');
    for result in results {
        output.push_str(&row(result).join(","));
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(generate_csv(&[]), "No test results available");
    }

    #[test]
    fn test_rows_and_escaping() {
        let mut result = TestResult::new("Chat, \"Quoted\"", Some("1.2"));
        result.supports_streaming = true;
        result.compatibility_score = 0.35;
        result.push_error("one");
        result.set_metric("invoke_latency", 0.5);

        let csv = generate_csv(&[result]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], HEADERS.join(","));
        assert!(lines[1].starts_with("\"Chat, \"\"Quoted\"\"\",1.2,"));
        assert!(lines[1].ends_with(",0.35,false,true,false,false,1,0,0.5,0"));
    }
}
