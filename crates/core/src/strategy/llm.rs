// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Text-generation strategy.
//!
//! Probes `invoke`, `ainvoke`, streaming, tool binding and structured
//! output. Tool binding and structured output count as supported as soon as
//! the bind succeeds; a failing call on the bound model only downgrades the
//! result to a warning.

use super::{CapabilityStrategy, Category};
use crate::capability::{Capability, MethodTable};
use crate::component::{Component, FieldKind, ModelInput, OutputSchema, ToolSpec};
use crate::probe::{
    blocking, guarded, handled, run_probes, seconds_since, PendingProbe, ProbeReport, ProbeSet,
    ScenarioOutcomes,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Maximum number of chunks consumed by the streaming probe.
pub const STREAM_CHUNK_CAP: usize = 10;

const REQUIRED_METHODS: &[&str] = &[
    "invoke",
    "ainvoke",
    "stream",
    "astream",
    "bind_tools",
    "with_structured_output",
];

const OPTIONAL_METHODS: &[&str] = &["batch", "abatch", "bind", "with_config"];

/// Strategy for LLM-like components.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextGenerationStrategy;

impl TextGenerationStrategy {
    /// Pending probes in declared order. Chat models extend this list.
    pub fn probes<'a>(
        &self,
        instance: &'a Arc<dyn Component>,
        methods: &'a MethodTable,
    ) -> Vec<PendingProbe<'a>> {
        vec![
            guarded("invoke", probe_invoke(instance)),
            guarded("ainvoke", probe_ainvoke(instance, methods)),
            guarded("streaming", probe_streaming(instance, methods)),
            guarded("bind_tools", probe_bind_tools(instance, methods)),
            guarded("structured_output", probe_structured_output(instance, methods)),
        ]
    }
}

/// Trivial two-argument tool bound by the tool-binding probe.
pub fn calculator_tool() -> ToolSpec {
    ToolSpec::new(
        "test_calculator",
        "Add two numbers together.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer" },
                "b": { "type": "integer" }
            },
            "required": ["a", "b"]
        }),
    )
}

/// Minimal schema bound by the structured-output probe.
pub fn test_response_schema() -> OutputSchema {
    OutputSchema::new("TestResponse")
        .field("answer", FieldKind::String)
        .field("confidence", FieldKind::Number)
}

async fn probe_invoke(instance: &Arc<dyn Component>) -> ProbeReport {
    let mut report = ProbeReport::default();
    let started = Instant::now();

    let prompt = ModelInput::text("Hello, this is a test message.");
    match blocking(instance, move |c| c.invoke(prompt)).await {
        Ok(output) => {
            let latency = seconds_since(started);
            report.metric("invoke_latency", latency);
            debug!(latency, "invoke probe finished");
            if output.is_empty() {
                report.warning("Invoke returned empty or invalid response");
            } else {
                report.pass();
            }
        }
        Err(e) => report.error(format!("Invoke test failed: {e}")),
    }
    report
}

async fn probe_ainvoke(instance: &Arc<dyn Component>, methods: &MethodTable) -> ProbeReport {
    let mut report = ProbeReport::default();
    if !methods.has("ainvoke") {
        report.warning("ainvoke method not available");
        return report;
    }

    let started = Instant::now();
    match instance
        .ainvoke(ModelInput::text("Hello, this is an async test message."))
        .await
    {
        Ok(output) => {
            report.metric("ainvoke_latency", seconds_since(started));
            report.supported(Capability::Async);
            if output.is_empty() {
                report.warning("Async invoke returned empty or invalid response");
            } else {
                report.pass();
            }
        }
        Err(e) => report.error(format!("Async invoke test failed: {e}")),
    }
    report
}

async fn probe_streaming(instance: &Arc<dyn Component>, methods: &MethodTable) -> ProbeReport {
    let mut report = ProbeReport::default();
    if !methods.has("stream") {
        report.warning("stream method not available");
        return report;
    }

    let started = Instant::now();
    let prompt = ModelInput::text("Tell me a short story.");
    let stream = match blocking(instance, move |c| c.stream(prompt)).await {
        Ok(stream) => stream,
        Err(e) => {
            report.error(format!("Streaming test failed: {e}"));
            return report;
        }
    };

    // The source may be unbounded; never pull more than the cap.
    let mut bounded = stream.take(STREAM_CHUNK_CAP);
    let mut chunks = 0usize;
    while let Some(chunk) = bounded.next().await {
        match chunk {
            Ok(_) => chunks += 1,
            Err(e) => {
                report.error(format!("Streaming test failed: {e}"));
                return report;
            }
        }
    }
    let latency = seconds_since(started);

    if chunks > 0 {
        report.supported(Capability::Streaming);
        report.metric("streaming_latency", latency);
        report.metric("chunks_received", chunks as f64);
        report.pass();
    } else {
        report.warning("Streaming produced no chunks");
    }
    report
}

async fn probe_bind_tools(instance: &Arc<dyn Component>, methods: &MethodTable) -> ProbeReport {
    let mut report = ProbeReport::default();
    if !methods.has("bind_tools") {
        report.error("bind_tools method not available");
        return report;
    }

    match blocking(instance, |c| c.bind_tools(vec![calculator_tool()])).await {
        Ok(bound) => {
            report.supported(Capability::ToolBinding);
            let prompt = ModelInput::text("What is 5 + 3?");
            match blocking(&bound, move |c| c.invoke(prompt)).await {
                Ok(output) => report.passed = !output.is_empty(),
                Err(e) => {
                    report.warning(format!("Tool binding works but execution failed: {e}"));
                    report.pass();
                }
            }
        }
        Err(e) => report.error(format!("bind_tools test failed: {e}")),
    }
    report
}

async fn probe_structured_output(instance: &Arc<dyn Component>, methods: &MethodTable) -> ProbeReport {
    let mut report = ProbeReport::default();
    if !methods.has("with_structured_output") {
        report.warning("with_structured_output method not available");
        return report;
    }

    let schema = test_response_schema();
    let bound_schema = schema.clone();
    match blocking(instance, move |c| c.with_structured_output(bound_schema)).await {
        Ok(structured) => {
            report.supported(Capability::StructuredOutput);
            let prompt = ModelInput::text("Respond with answer='test' and confidence=0.9");
            match blocking(&structured, move |c| c.invoke(prompt)).await {
                Ok(output) => {
                    report.passed = output
                        .structured
                        .as_ref()
                        .map(|value| schema.validate(value))
                        .unwrap_or(false);
                }
                Err(e) => {
                    report.warning(format!(
                        "Structured output binding works but execution failed: {e}"
                    ));
                    report.pass();
                }
            }
        }
        Err(e) => report.error(format!("Structured output test failed: {e}")),
    }
    report
}

#[async_trait]
impl CapabilityStrategy for TextGenerationStrategy {
    fn category(&self) -> Category {
        Category::Llms
    }

    fn required_methods(&self) -> &'static [&'static str] {
        REQUIRED_METHODS
    }

    fn optional_methods(&self) -> &'static [&'static str] {
        OPTIONAL_METHODS
    }

    fn functionality_failure(&self) -> &'static str {
        "Method functionality testing failed"
    }

    async fn probe_functionality(
        &self,
        instance: &Arc<dyn Component>,
        methods: &MethodTable,
    ) -> ProbeSet {
        run_probes(self.probes(instance, methods)).await
    }

    async fn probe_error_scenarios(
        &self,
        instance: &Arc<dyn Component>,
        methods: &MethodTable,
    ) -> ScenarioOutcomes {
        let mut scenarios = ScenarioOutcomes::new();

        scenarios.insert(
            "handles_empty_input".to_string(),
            handled(instance, |c| c.invoke(ModelInput::text(""))).await,
        );

        let long_input = "test ".repeat(10_000);
        scenarios.insert(
            "handles_long_input".to_string(),
            handled(instance, move |c| c.invoke(ModelInput::Text(long_input))).await,
        );

        if methods.has("bind_tools") {
            scenarios.insert(
                "handles_empty_tools".to_string(),
                handled(instance, |c| c.bind_tools(Vec::new())).await,
            );
        }

        scenarios
    }
}
