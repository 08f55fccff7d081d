// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Health-check configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! `LIH_*` environment variables. Provider API keys come from any
//! `<PROVIDER>_API_KEY` variable.
//!
//! # Example
//!
//! ```ignore
//! use llm_health_adapters::HealthConfig;
//!
//! let config = HealthConfig::load(Some("integration_health.json".as_ref()))?;
//! let args = config.integration_config("ChatOpenAI");
//! ```

use llm_health_core::{ComponentConfig, SuiteOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "LIH";

const API_KEY_SUFFIX: &str = "_API_KEY";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for this schema.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Layering sources failed, e.g. an environment value of the wrong type.
    #[error("Config source error: {0}")]
    Source(#[from] ::config::ConfigError),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings for discovering, testing and storing integrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Path of the result store.
    pub database_url: String,
    /// Per-integration time limit in seconds; `0` disables it.
    pub test_timeout: u64,
    /// Test integrations concurrently.
    pub parallel_tests: bool,
    /// Upper bound on concurrently tested integrations.
    pub max_concurrency: usize,
    /// Ask components to avoid real provider calls.
    pub mock_mode: bool,
    /// Test every registered integration when none is named. When off, an
    /// integration must be selected explicitly.
    pub auto_discovery: bool,
    /// Name patterns used when listing integrations.
    pub discovery_patterns: Vec<String>,
    /// Provider name to API key.
    pub api_keys: BTreeMap<String, String>,
    /// Write latency and count metrics to the records.
    pub performance_tracking: bool,
    /// Accepted so existing configuration files keep loading. No command
    /// reads it yet.
    pub benchmark_iterations: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            database_url: "integration_health.jsonl".to_string(),
            test_timeout: 30,
            parallel_tests: true,
            max_concurrency: 8,
            mock_mode: false,
            auto_discovery: true,
            discovery_patterns: vec!["*".to_string()],
            api_keys: BTreeMap::new(),
            performance_tracking: true,
            benchmark_iterations: 3,
        }
    }
}

impl HealthConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from `LIH_*` environment variables on top of the defaults.
    ///
    /// A `.env` file in the working directory is read first.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Layer defaults, an optional JSON file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Json)
                    .required(false),
            );
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.api_keys.extend(api_keys_from(std::env::vars()));
        Ok(config)
    }

    /// Write as pretty-printed JSON.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Constructor arguments for the integration called `name`.
    pub fn integration_config(&self, name: &str) -> ComponentConfig {
        let mut config = ComponentConfig::new();
        if let Some(key) = self.api_keys.get(&provider_name(name)) {
            config.insert("api_key".into(), key.clone().into());
        }
        config.insert("timeout".into(), self.test_timeout.into());
        config.insert("mock_mode".into(), self.mock_mode.into());
        config
    }

    /// Suite options derived from these settings.
    pub fn suite_options(&self) -> SuiteOptions {
        SuiteOptions {
            parallel: self.parallel_tests,
            max_concurrency: self.max_concurrency.max(1),
            timeout: (self.test_timeout > 0).then(|| Duration::from_secs(self.test_timeout)),
            record_metrics: self.performance_tracking,
            ..SuiteOptions::default()
        }
    }

    /// Whether `name` matches one of the discovery patterns.
    pub fn matches_discovery(&self, name: &str) -> bool {
        self.discovery_patterns
            .iter()
            .any(|pattern| glob_match(&pattern.to_lowercase(), &name.to_lowercase()))
    }
}

/// Collect `<PROVIDER>_API_KEY` variables keyed by lowercased provider.
fn api_keys_from(vars: impl Iterator<Item = (String, String)>) -> BTreeMap<String, String> {
    vars.filter_map(|(key, value)| {
        let provider = key.strip_suffix(API_KEY_SUFFIX)?;
        (!provider.is_empty()).then(|| (provider.to_lowercase(), value))
    })
    .collect()
}

/// Provider key used to look up an API key for an integration name.
pub fn provider_name(integration_name: &str) -> String {
    let name = integration_name.to_lowercase();
    let contains_any = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

    let provider = if contains_any(&["openai"]) {
        "openai"
    } else if contains_any(&["anthropic", "claude"]) {
        "anthropic"
    } else if contains_any(&["google", "gemini"]) {
        "google"
    } else if contains_any(&["azure"]) {
        "azure"
    } else if contains_any(&["aws", "bedrock"]) {
        "aws"
    } else if contains_any(&["huggingface", "hf"]) {
        "huggingface"
    } else if contains_any(&["cohere"]) {
        "cohere"
    } else if contains_any(&["mlx"]) {
        "mlx"
    } else {
        return name;
    };
    provider.to_string()
}

/// `*` matches any run of characters; everything else matches literally.
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let (first, last) = (parts[0], parts[parts.len() - 1]);
    if !text.starts_with(first) || text.len() < first.len() + last.len() || !text.ends_with(last) {
        return false;
    }

    let mut rest = &text[first.len()..text.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }
    true
}
