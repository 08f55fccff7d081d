// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Registry of testable component types.
//!
//! Component types are registered explicitly per [`Category`]. The built-in
//! registry carries the deterministic mocks from [`crate::mock`].

use crate::mock::{MockEmbeddings, MockModel};
use llm_health_core::{
    Category, Component, ComponentConfig, ComponentType, MethodShape, MethodTable, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Constructor of a built-in component.
pub type Constructor = fn(&ComponentConfig) -> Result<Arc<dyn Component>>;

/// Method surface of a generation model.
pub const GENERATION_METHODS: &[(&str, MethodShape)] = &[
    ("invoke", MethodShape::Sync),
    ("ainvoke", MethodShape::Async),
    ("stream", MethodShape::Stream),
    ("astream", MethodShape::Stream),
    ("bind_tools", MethodShape::Sync),
    ("with_structured_output", MethodShape::Sync),
];

/// Method surface of an embedding model.
pub const EMBEDDING_METHODS: &[(&str, MethodShape)] = &[
    ("embed_documents", MethodShape::Sync),
    ("embed_query", MethodShape::Sync),
    ("aembed_documents", MethodShape::Async),
    ("aembed_query", MethodShape::Async),
];

/// A component type described by static data and a constructor function.
#[derive(Clone)]
pub struct BuiltinComponent {
    name: &'static str,
    module: &'static str,
    version: Option<&'static str>,
    methods: &'static [(&'static str, MethodShape)],
    constructor: Constructor,
}

impl BuiltinComponent {
    /// Describe a component type.
    pub const fn new(
        name: &'static str,
        module: &'static str,
        methods: &'static [(&'static str, MethodShape)],
        constructor: Constructor,
    ) -> Self {
        Self {
            name,
            module,
            version: None,
            methods,
            constructor,
        }
    }

    /// Attach a version.
    pub const fn with_version(mut self, version: &'static str) -> Self {
        self.version = Some(version);
        self
    }
}

impl ComponentType for BuiltinComponent {
    fn name(&self) -> &str {
        self.name
    }

    fn module(&self) -> &str {
        self.module
    }

    fn version(&self) -> Option<&str> {
        self.version
    }

    fn method_table(&self) -> MethodTable {
        self.methods.iter().map(|(name, shape)| (*name, *shape)).collect()
    }

    fn instantiate(&self, config: &ComponentConfig) -> Result<Arc<dyn Component>> {
        (self.constructor)(config)
    }
}

impl fmt::Debug for BuiltinComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinComponent")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("version", &self.version)
            .finish()
    }
}

/// Descriptive record of a registered component type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationInfo {
    /// Integration name.
    pub name: String,
    /// Origin module.
    pub module: String,
    /// Version, or `unknown`.
    pub version: String,
    /// Category it is tested under.
    pub category: Category,
    /// Callable declared methods.
    pub methods: Vec<String>,
}

impl IntegrationInfo {
    /// Describe `component` registered under `category`.
    pub fn describe(category: Category, component: &dyn ComponentType) -> Self {
        let table = component.method_table();
        Self {
            name: component.name().to_string(),
            module: component.module().to_string(),
            version: component
                .version()
                .unwrap_or(llm_health_core::result::UNKNOWN_VERSION)
                .to_string(),
            category,
            methods: table
                .names()
                .filter(|name| table.shape(name).is_some_and(MethodShape::is_callable))
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Component types grouped by category.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    components: BTreeMap<Category, Vec<Arc<dyn ComponentType>>>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in mock integrations.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let version = env!("CARGO_PKG_VERSION");
        registry.register(
            Category::Llms,
            Arc::new(
                BuiltinComponent::new(
                    "MockLLM",
                    "llm_health_adapters::mock",
                    GENERATION_METHODS,
                    MockModel::llm,
                )
                .with_version(version),
            ),
        );
        registry.register(
            Category::ChatModels,
            Arc::new(
                BuiltinComponent::new(
                    "MockChatModel",
                    "llm_health_adapters::mock",
                    GENERATION_METHODS,
                    MockModel::chat,
                )
                .with_version(version),
            ),
        );
        registry.register(
            Category::Embeddings,
            Arc::new(
                BuiltinComponent::new(
                    "MockEmbeddings",
                    "llm_health_adapters::mock",
                    EMBEDDING_METHODS,
                    MockEmbeddings::from_config,
                )
                .with_version(version),
            ),
        );
        registry
    }

    /// Register a component type. A type with the same name in the same
    /// category is replaced.
    pub fn register(&mut self, category: Category, component: Arc<dyn ComponentType>) {
        let entries = self.components.entry(category).or_default();
        if let Some(existing) = entries.iter_mut().find(|c| c.name() == component.name()) {
            debug!(name = component.name(), %category, "Replacing registered component");
            *existing = component;
        } else {
            debug!(name = component.name(), %category, "Registered component");
            entries.push(component);
        }
    }

    /// Component types registered under `category`.
    pub fn components(&self, category: Category) -> &[Arc<dyn ComponentType>] {
        self.components
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every registration in category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &Arc<dyn ComponentType>)> {
        self.components
            .iter()
            .flat_map(|(category, list)| list.iter().map(move |c| (*category, c)))
    }

    /// Registrations filtered by category and exact integration name.
    pub fn select(
        &self,
        category: Option<Category>,
        name: Option<&str>,
    ) -> Vec<(Category, Arc<dyn ComponentType>)> {
        self.iter()
            .filter(|(c, _)| category.map_or(true, |wanted| *c == wanted))
            .filter(|(_, component)| name.map_or(true, |wanted| component.name() == wanted))
            .map(|(c, component)| (c, component.clone()))
            .collect()
    }

    /// Number of registered component types.
    pub fn total(&self) -> usize {
        self.components.values().map(Vec::len).sum()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Descriptions of every registration.
    pub fn infos(&self) -> Vec<IntegrationInfo> {
        self.iter()
            .map(|(category, component)| IntegrationInfo::describe(category, component.as_ref()))
            .collect()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (category, list) in &self.components {
            let names: Vec<&str> = list.iter().map(|c| c.name()).collect();
            map.entry(category, &names);
        }
        map.finish()
    }
}
