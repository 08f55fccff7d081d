// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Integration test harness.
//!
//! [`IntegrationTester`] drives one component type through a fixed,
//! strictly sequential pipeline:
//!
//! ```text
//! Instantiation -> RequiredMethods -> Functionality -> ErrorHandling -> Scoring
//! ```
//!
//! A failing phase never prevents the next one from running. Anything that
//! escapes every phase boundary is caught once at the top and recorded as
//! `Test execution failed: ...`, so [`IntegrationTester::run_all_tests`]
//! always yields a record.
//!
//! # Example
//!
//! ```ignore
//! use llm_health_core::harness::IntegrationTester;
//! use llm_health_core::strategy::Category;
//!
//! let mut tester = IntegrationTester::new(Category::ChatModels, component, config);
//! let result = tester.run_all_tests().await;
//! println!("{}: {:.2}", result.integration_name, result.compatibility_score);
//! ```

use crate::capability::{MethodPresence, MethodTable};
use crate::component::{Component, ComponentConfig, ComponentType};
use crate::error::{panic_message, ComponentError, HarnessError};
use crate::probe::{Finding, ScenarioOutcomes};
use crate::result::TestResult;
use crate::score;
use crate::strategy::{CapabilityStrategy, Category, Strategy};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Constructing the component.
    Instantiation,
    /// Checking declared methods.
    RequiredMethods,
    /// Running functional probes.
    Functionality,
    /// Running negative-input probes.
    ErrorHandling,
    /// Computing the score.
    Scoring,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Instantiation => "instantiation",
            Self::RequiredMethods => "required method check",
            Self::Functionality => "functionality probing",
            Self::ErrorHandling => "error handling probing",
            Self::Scoring => "score computation",
        };
        f.write_str(name)
    }
}

/// How component instances are shared between phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstancePolicy {
    /// Construct once per run and hand the same instance to every phase.
    #[default]
    Shared,
    /// Construct a fresh instance for each phase that needs one.
    PerPhase,
}

/// Phase outcomes of the last run that are not stored on the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Whether instantiation succeeded.
    pub instantiated: bool,
    /// Required method name to presence.
    pub required_methods: BTreeMap<String, bool>,
    /// Optional method name to presence.
    pub optional_methods: BTreeMap<String, bool>,
    /// Functional probe name to pass/fail.
    pub functionality: BTreeMap<String, bool>,
    /// Error scenario name to "handled without failing".
    pub error_scenarios: ScenarioOutcomes,
}

type InstanceHandle = std::result::Result<Arc<dyn Component>, String>;

/// Runs one capability strategy against one component type.
pub struct IntegrationTester {
    component: Arc<dyn ComponentType>,
    config: ComponentConfig,
    strategy: Strategy,
    policy: InstancePolicy,
    record_metrics: bool,
    methods: MethodTable,
    phase: Phase,
    results: TestResult,
    report: RunReport,
}

impl IntegrationTester {
    /// Create a tester using the strategy for `category`.
    pub fn new(
        category: Category,
        component: Arc<dyn ComponentType>,
        config: ComponentConfig,
    ) -> Self {
        Self::with_strategy(Strategy::for_category(category), component, config)
    }

    /// Create a tester with an explicit strategy.
    pub fn with_strategy(
        strategy: Strategy,
        component: Arc<dyn ComponentType>,
        config: ComponentConfig,
    ) -> Self {
        let results = TestResult::for_component(component.as_ref());
        Self {
            component,
            config,
            strategy,
            policy: InstancePolicy::default(),
            record_metrics: true,
            methods: MethodTable::new(),
            phase: Phase::Instantiation,
            results,
            report: RunReport::default(),
        }
    }

    /// Set the instance sharing policy.
    pub fn instance_policy(mut self, policy: InstancePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether latency and count metrics are written to the record.
    /// Enabled by default.
    pub fn record_metrics(mut self, enabled: bool) -> Self {
        self.record_metrics = enabled;
        self
    }

    /// Strategy in use.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Component under test.
    pub fn component(&self) -> &Arc<dyn ComponentType> {
        &self.component
    }

    /// Record of the current or last run.
    pub fn results(&self) -> &TestResult {
        &self.results
    }

    /// Phase outcomes of the last run.
    pub fn last_report(&self) -> &RunReport {
        &self.report
    }

    /// Run the whole pipeline and return the finished record.
    ///
    /// Never panics. Each call starts from a fresh record.
    pub async fn run_all_tests(&mut self) -> TestResult {
        self.results = TestResult::for_component(self.component.as_ref());
        self.report = RunReport::default();
        self.phase = Phase::Instantiation;

        let outcome = AssertUnwindSafe(self.run_pipeline()).catch_unwind().await;
        let failure = match outcome {
            Ok(()) => None,
            Err(payload) => Some(HarnessError::Panicked {
                phase: self.phase.to_string(),
                message: panic_message(payload),
            }),
        };

        if let Some(e) = failure {
            error!(
                integration = %self.results.integration_name,
                error = %e,
                "Test execution failed"
            );
            self.results.push_error(format!("Test execution failed: {e}"));
        }

        self.results.clone()
    }

    async fn run_pipeline(&mut self) {
        self.phase = Phase::Instantiation;
        let instance = self.test_instantiation().await;

        self.phase = Phase::RequiredMethods;
        self.report.required_methods = self.test_required_methods();
        self.report.optional_methods = self.test_optional_methods();

        self.phase = Phase::Functionality;
        let functionality_instance = self.instance_for_phase(&instance).await;
        self.report.functionality = self.test_method_functionality(functionality_instance).await;

        self.phase = Phase::ErrorHandling;
        let error_instance = self.instance_for_phase(&instance).await;
        self.report.error_scenarios = self.test_error_handling(error_instance).await;

        self.phase = Phase::Scoring;
        self.calculate_compatibility_score();
    }

    // Constructors run on the blocking pool like every other synchronous
    // component call.
    async fn construct(&self) -> InstanceHandle {
        let component = Arc::clone(&self.component);
        let config = self.config.clone();
        match tokio::task::spawn_blocking(move || component.instantiate(&config)).await {
            Ok(Ok(instance)) => Ok(instance),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) if e.is_panic() => Err(ComponentError::Construction(format!(
                "constructor panicked: {}",
                panic_message(e.into_panic())
            ))
            .to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn instance_for_phase(&self, shared: &InstanceHandle) -> InstanceHandle {
        match self.policy {
            InstancePolicy::Shared => shared.clone(),
            InstancePolicy::PerPhase => self.construct().await,
        }
    }

    async fn test_instantiation(&mut self) -> InstanceHandle {
        let instance = self.construct().await;
        match &instance {
            Ok(_) => {
                self.report.instantiated = true;
                info!(integration = %self.results.integration_name, "Successfully instantiated");
            }
            Err(cause) => {
                warn!(integration = %self.results.integration_name, cause = %cause, "Instantiation failed");
                self.results.push_error(format!("Instantiation failed: {cause}"));
            }
        }
        instance
    }

    fn test_required_methods(&mut self) -> BTreeMap<String, bool> {
        self.methods = self.component.method_table();
        let mut presence = BTreeMap::new();

        for name in self.strategy.required_methods() {
            let available = match self.methods.presence(name) {
                MethodPresence::Callable => true,
                MethodPresence::Missing => {
                    self.results
                        .push_error(format!("Missing required method: {name}"));
                    false
                }
                MethodPresence::NotCallable => {
                    self.results
                        .push_error(format!("Method {name} is not callable"));
                    false
                }
            };
            presence.insert(name.to_string(), available);
        }

        presence
    }

    fn test_optional_methods(&self) -> BTreeMap<String, bool> {
        self.strategy
            .optional_methods()
            .iter()
            .map(|name| {
                let available = self.methods.presence(name) == MethodPresence::Callable;
                if !available {
                    debug!(integration = %self.results.integration_name, method = %name, "Optional method not available");
                }
                (name.to_string(), available)
            })
            .collect()
    }

    async fn test_method_functionality(&mut self, instance: InstanceHandle) -> BTreeMap<String, bool> {
        let instance = match instance {
            Ok(instance) => instance,
            Err(cause) => {
                self.results.push_error(format!(
                    "{}: {cause}",
                    self.strategy.functionality_failure()
                ));
                return BTreeMap::new();
            }
        };

        let probes = self
            .strategy
            .probe_functionality(&instance, &self.methods)
            .await;

        let mut outcomes = BTreeMap::new();
        for (name, report) in probes {
            debug!(
                integration = %self.results.integration_name,
                probe = %name,
                passed = report.passed,
                "Probe finished"
            );
            outcomes.insert(name, report.passed);
            for finding in report.findings {
                if !self.record_metrics && matches!(finding, Finding::Metric(..)) {
                    continue;
                }
                self.results.apply(finding);
            }
        }
        outcomes
    }

    async fn test_error_handling(&mut self, instance: InstanceHandle) -> ScenarioOutcomes {
        match instance {
            Ok(instance) => {
                self.strategy
                    .probe_error_scenarios(&instance, &self.methods)
                    .await
            }
            Err(cause) => {
                self.results
                    .push_warning(format!("Error handling test failed: {cause}"));
                ScenarioOutcomes::new()
            }
        }
    }

    fn calculate_compatibility_score(&mut self) -> f64 {
        self.results.compatibility_score = score::compatibility_score(&self.results);
        self.results.compatibility_score
    }
}

impl fmt::Debug for IntegrationTester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationTester")
            .field("component", &self.component.name())
            .field("category", &self.strategy.category())
            .field("policy", &self.policy)
            .finish()
    }
}
