// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Probe outcomes.
//!
//! Probes never touch the result record. Each one returns a [`ProbeReport`]
//! listing what it found, and the harness applies the findings serially in
//! the strategy's declared probe order. This keeps concurrently issued probes
//! from interleaving writes and makes repeated runs produce identical records.
//!
//! Synchronous component methods may block for as long as the provider
//! takes. They are only ever called through [`blocking`] or [`handled`],
//! which run them on tokio's blocking pool so that probes interleave and an
//! enclosing timeout can still fire.

use crate::capability::Capability;
use crate::component::Component;
use crate::error::{panic_message, ComponentError, Result};
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// A single delta produced by a probe.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// A capability flag should be set.
    Supported(Capability),
    /// A metric should be recorded.
    Metric(String, f64),
    /// A hard failure.
    Error(String),
    /// A soft failure.
    Warning(String),
}

/// Outcome of one probe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    /// Whether the probe passed.
    pub passed: bool,
    /// Deltas to apply to the record, in order.
    pub findings: Vec<Finding>,
}

impl ProbeReport {
    /// Mark the probe as passed.
    pub fn pass(&mut self) {
        self.passed = true;
    }

    /// Record a supported capability.
    pub fn supported(&mut self, capability: Capability) {
        self.findings.push(Finding::Supported(capability));
    }

    /// Record a metric.
    pub fn metric(&mut self, name: impl Into<String>, value: f64) {
        self.findings.push(Finding::Metric(name.into(), value));
    }

    /// Record a hard failure.
    pub fn error(&mut self, message: impl Into<String>) {
        self.findings.push(Finding::Error(message.into()));
    }

    /// Record a soft failure.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.findings.push(Finding::Warning(message.into()));
    }

    /// Build a failed report carrying a single error.
    pub fn failed(message: impl Into<String>) -> Self {
        let mut report = Self::default();
        report.error(message);
        report
    }
}

/// Named probe outcomes in declared order.
pub type ProbeSet = Vec<(String, ProbeReport)>;

/// Per-scenario "handled without failing" outcomes.
pub type ScenarioOutcomes = BTreeMap<String, bool>;

/// A named probe future awaiting execution.
pub type PendingProbe<'a> = BoxFuture<'a, (String, ProbeReport)>;

/// Wrap a probe so a panic inside the component becomes an error finding.
pub fn guarded<'a, F>(name: &'static str, probe: F) -> PendingProbe<'a>
where
    F: Future<Output = ProbeReport> + Send + 'a,
{
    async move {
        let report = match AssertUnwindSafe(probe).catch_unwind().await {
            Ok(report) => report,
            Err(payload) => ProbeReport::failed(format!(
                "{name} probe panicked: {}",
                panic_message(payload)
            )),
        };
        (name.to_string(), report)
    }
    .boxed()
}

/// Run probes concurrently; results keep the input order.
pub async fn run_probes(probes: Vec<PendingProbe<'_>>) -> ProbeSet {
    futures::future::join_all(probes).await
}

/// Run a synchronous component call on the blocking pool.
///
/// A panic inside `call` is resumed on the calling task, so [`guarded`]
/// still reports it against the probe that made the call.
pub async fn blocking<T, F>(instance: &Arc<dyn Component>, call: F) -> Result<T>
where
    F: FnOnce(&dyn Component) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let instance = Arc::clone(instance);
    match tokio::task::spawn_blocking(move || call(instance.as_ref())).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(ComponentError::Other(e.to_string())),
    }
}

/// Whether a synchronous call completed without returning an error or
/// panicking.
pub async fn handled<T, F>(instance: &Arc<dyn Component>, call: F) -> bool
where
    F: FnOnce(&dyn Component) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let instance = Arc::clone(instance);
    matches!(
        tokio::task::spawn_blocking(move || call(instance.as_ref())).await,
        Ok(Ok(_))
    )
}

/// Seconds elapsed since `started`.
pub fn seconds_since(started: Instant) -> f64 {
    started.elapsed().as_secs_f64()
}
