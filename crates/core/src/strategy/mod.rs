// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Capability test strategies.
//!
//! Each integration category has a strategy that fixes the required and
//! optional method lists and supplies two probe operations. The closed set
//! of strategies is exposed as the [`Strategy`] enum, dispatched by
//! [`Category`].

pub mod chat;
pub mod embeddings;
pub mod llm;

pub use chat::ChatStrategy;
pub use embeddings::EmbeddingStrategy;
pub use llm::TextGenerationStrategy;

use crate::capability::MethodTable;
use crate::component::Component;
use crate::probe::{ProbeSet, ScenarioOutcomes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Integration category, as supplied by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Text-completion models.
    Llms,
    /// Message-oriented chat models.
    ChatModels,
    /// Embedding models.
    Embeddings,
}

impl Category {
    /// All categories in registry order.
    pub const ALL: [Category; 3] = [Category::Llms, Category::ChatModels, Category::Embeddings];

    /// Registry key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llms => "llms",
            Self::ChatModels => "chat_models",
            Self::Embeddings => "embeddings",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown integration category: {0} (expected llms, chat_models or embeddings)")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "llms" | "llm" => Ok(Self::Llms),
            "chat_models" | "chat_model" | "chat" => Ok(Self::ChatModels),
            "embeddings" | "embedding" => Ok(Self::Embeddings),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// Per-category probing policy.
#[async_trait]
pub trait CapabilityStrategy: Send + Sync {
    /// Category this strategy tests.
    fn category(&self) -> Category;

    /// Methods whose absence is an error.
    fn required_methods(&self) -> &'static [&'static str];

    /// Methods whose absence is only logged.
    fn optional_methods(&self) -> &'static [&'static str];

    /// Error prefix used when functionality probing cannot run at all.
    fn functionality_failure(&self) -> &'static str;

    /// Run the category's functional probes against a live instance.
    async fn probe_functionality(
        &self,
        instance: &Arc<dyn Component>,
        methods: &MethodTable,
    ) -> ProbeSet;

    /// Feed deliberately bad input and record which scenarios were handled.
    async fn probe_error_scenarios(
        &self,
        instance: &Arc<dyn Component>,
        methods: &MethodTable,
    ) -> ScenarioOutcomes;
}

/// The closed set of strategies.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// LLM-like components.
    TextGeneration(TextGenerationStrategy),
    /// Chat-like components.
    ChatStyle(ChatStrategy),
    /// Embedding components.
    Embedding(EmbeddingStrategy),
}

impl Strategy {
    /// Strategy for a registry category.
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Llms => Self::TextGeneration(TextGenerationStrategy),
            Category::ChatModels => Self::ChatStyle(ChatStrategy::default()),
            Category::Embeddings => Self::Embedding(EmbeddingStrategy),
        }
    }

    fn inner(&self) -> &dyn CapabilityStrategy {
        match self {
            Self::TextGeneration(s) => s,
            Self::ChatStyle(s) => s,
            Self::Embedding(s) => s,
        }
    }
}

impl From<Category> for Strategy {
    fn from(category: Category) -> Self {
        Self::for_category(category)
    }
}

#[async_trait]
impl CapabilityStrategy for Strategy {
    fn category(&self) -> Category {
        self.inner().category()
    }

    fn required_methods(&self) -> &'static [&'static str] {
        self.inner().required_methods()
    }

    fn optional_methods(&self) -> &'static [&'static str] {
        self.inner().optional_methods()
    }

    fn functionality_failure(&self) -> &'static str {
        self.inner().functionality_failure()
    }

    async fn probe_functionality(
        &self,
        instance: &Arc<dyn Component>,
        methods: &MethodTable,
    ) -> ProbeSet {
        self.inner().probe_functionality(instance, methods).await
    }

    async fn probe_error_scenarios(
        &self,
        instance: &Arc<dyn Component>,
        methods: &MethodTable,
    ) -> ScenarioOutcomes {
        self.inner().probe_error_scenarios(instance, methods).await
    }
}

#[cfg(test)]
pub(crate) mod test_support;
