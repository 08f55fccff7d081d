// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fan-out across many components.
//!
//! Each entry gets its own [`IntegrationTester`] and record, so parallel
//! runs share no mutable state. Results come back in input order.

use crate::component::{ComponentConfig, ComponentType};
use crate::harness::{InstancePolicy, IntegrationTester};
use crate::result::TestResult;
use crate::score;
use crate::strategy::Category;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// One component scheduled for testing.
#[derive(Clone)]
pub struct SuiteEntry {
    /// Category, selecting the strategy.
    pub category: Category,
    /// Component type under test.
    pub component: Arc<dyn ComponentType>,
    /// Constructor arguments.
    pub config: ComponentConfig,
}

impl SuiteEntry {
    /// Create an entry.
    pub fn new(category: Category, component: Arc<dyn ComponentType>, config: ComponentConfig) -> Self {
        Self {
            category,
            component,
            config,
        }
    }
}

/// Suite execution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteOptions {
    /// Run components concurrently.
    pub parallel: bool,
    /// Upper bound on concurrently running components.
    pub max_concurrency: usize,
    /// Per-component time limit.
    pub timeout: Option<Duration>,
    /// Instance sharing policy handed to every tester.
    pub instance_policy: InstancePolicy,
    /// Write performance metrics to the records.
    pub record_metrics: bool,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_concurrency: 8,
            timeout: Some(Duration::from_secs(30)),
            instance_policy: InstancePolicy::Shared,
            record_metrics: true,
        }
    }
}

/// A batch of components to test.
#[derive(Default)]
pub struct TestSuite {
    entries: Vec<SuiteEntry>,
    options: SuiteOptions,
}

impl TestSuite {
    /// Create an empty suite.
    pub fn new(options: SuiteOptions) -> Self {
        Self {
            entries: Vec::new(),
            options,
        }
    }

    /// Schedule a component.
    pub fn add(&mut self, entry: SuiteEntry) {
        self.entries.push(entry);
    }

    /// Number of scheduled components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every entry and return one record per entry, in input order.
    pub async fn run(self) -> Vec<TestResult> {
        info!(
            components = self.entries.len(),
            parallel = self.options.parallel,
            "Running integration test suite"
        );

        if !self.options.parallel {
            let mut results = Vec::with_capacity(self.entries.len());
            for entry in self.entries {
                results.push(run_entry(entry, self.options).await);
            }
            return results;
        }

        let permits = Arc::new(Semaphore::new(self.options.max_concurrency.max(1)));
        let mut handles = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            let fallback = TestResult::for_component(entry.component.as_ref());
            let permits = permits.clone();
            let options = self.options;
            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                run_entry(entry, options).await
            });
            handles.push((fallback, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (mut fallback, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(integration = %fallback.integration_name, error = %e, "Test task aborted");
                    fallback.push_error(format!("Test execution failed: {e}"));
                    fallback.compatibility_score = score::compatibility_score(&fallback);
                    results.push(fallback);
                }
            }
        }
        results
    }
}

async fn run_entry(entry: SuiteEntry, options: SuiteOptions) -> TestResult {
    let mut tester = IntegrationTester::new(entry.category, entry.component, entry.config)
        .instance_policy(options.instance_policy)
        .record_metrics(options.record_metrics);

    let Some(limit) = options.timeout else {
        return tester.run_all_tests().await;
    };

    match tokio::time::timeout(limit, tester.run_all_tests()).await {
        Ok(result) => result,
        Err(_) => {
            let mut partial = tester.results().clone();
            warn!(integration = %partial.integration_name, ?limit, "Test timed out");
            partial.push_error(format!("Test timed out after {}s", limit.as_secs_f64()));
            partial.compatibility_score = score::compatibility_score(&partial);
            partial
        }
    }
}
