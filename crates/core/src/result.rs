// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Integration test result record.
//!
//! One [`TestResult`] captures one run of one component under one
//! configuration. The harness is its only writer; once returned, consumers
//! such as storage and reporting treat it as read-only.

use crate::capability::Capability;
use crate::component::ComponentType;
use crate::probe::Finding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;

/// Version sentinel used when a component does not report one.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Name recorded when a component cannot report its own name.
pub const UNKNOWN_INTEGRATION: &str = "unknown integration";

/// Outcome of testing one integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Integration name.
    pub integration_name: String,
    /// Integration version, or [`UNKNOWN_VERSION`].
    pub integration_version: String,
    /// When the run started.
    pub tested_at: DateTime<Utc>,
    /// Tools can be bound.
    pub supports_tool_binding: bool,
    /// Streaming works.
    pub supports_streaming: bool,
    /// Structured output works.
    pub supports_structured_output: bool,
    /// Async invocation works.
    pub supports_async: bool,
    /// Hard failures, in the order they were found.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Soft failures, in the order they were found.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Named numeric measurements (latencies in seconds, counts).
    #[serde(default)]
    pub performance_metrics: BTreeMap<String, f64>,
    /// Score in `[0.0, 1.0]`, written once when the run completes.
    #[serde(default)]
    pub compatibility_score: f64,
}

impl TestResult {
    /// Create an empty record stamped with the current time.
    pub fn new(integration_name: impl Into<String>, integration_version: Option<&str>) -> Self {
        Self {
            integration_name: integration_name.into(),
            integration_version: integration_version.unwrap_or(UNKNOWN_VERSION).to_string(),
            tested_at: Utc::now(),
            supports_tool_binding: false,
            supports_streaming: false,
            supports_structured_output: false,
            supports_async: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            performance_metrics: BTreeMap::new(),
            compatibility_score: 0.0,
        }
    }

    /// Create an empty record for a component type.
    ///
    /// A component whose `name` or `version` panics is recorded as
    /// [`UNKNOWN_INTEGRATION`] / [`UNKNOWN_VERSION`].
    pub fn for_component(component: &dyn ComponentType) -> Self {
        let identity = std::panic::catch_unwind(AssertUnwindSafe(|| {
            (
                component.name().to_string(),
                component.version().map(str::to_string),
            )
        }));
        match identity {
            Ok((name, version)) => Self::new(name, version.as_deref()),
            Err(_) => Self::new(UNKNOWN_INTEGRATION, None),
        }
    }

    /// Whether a capability flag is set.
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::ToolBinding => self.supports_tool_binding,
            Capability::Streaming => self.supports_streaming,
            Capability::StructuredOutput => self.supports_structured_output,
            Capability::Async => self.supports_async,
        }
    }

    /// Set a capability flag. Flags are never cleared within a run.
    pub fn mark_supported(&mut self, capability: Capability) {
        match capability {
            Capability::ToolBinding => self.supports_tool_binding = true,
            Capability::Streaming => self.supports_streaming = true,
            Capability::StructuredOutput => self.supports_structured_output = true,
            Capability::Async => self.supports_async = true,
        }
    }

    /// Number of capability flags set.
    pub fn supported_count(&self) -> usize {
        Capability::ALL.iter().filter(|c| self.supports(**c)).count()
    }

    /// Append a hard failure.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Append a soft failure.
    pub fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record a metric, overwriting any previous value for the same name.
    pub fn set_metric(&mut self, name: impl Into<String>, value: f64) {
        self.performance_metrics.insert(name.into(), value);
    }

    /// Apply one probe finding.
    pub fn apply(&mut self, finding: Finding) {
        match finding {
            Finding::Supported(capability) => self.mark_supported(capability),
            Finding::Metric(name, value) => self.set_metric(name, value),
            Finding::Error(message) => self.push_error(message),
            Finding::Warning(message) => self.push_warning(message),
        }
    }

    /// Score bucket used by reports: `High`, `Medium` or `Low`.
    pub fn score_label(&self) -> &'static str {
        if self.compatibility_score >= 0.8 {
            "High"
        } else if self.compatibility_score >= 0.5 {
            "Medium"
        } else {
            "Low"
        }
    }
}
