// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Capability flags and declared method tables.
//!
//! Components declare the methods they expose through a [`MethodTable`]
//! instead of being introspected at runtime. The harness only ever asks the
//! table whether a name is present and callable, so the rest of the pipeline
//! stays independent of how a component registers its surface.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the four scored capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Tools can be bound to the model.
    ToolBinding,
    /// Output can be streamed in chunks.
    Streaming,
    /// Output can be constrained to a schema.
    StructuredOutput,
    /// Asynchronous invocation works.
    Async,
}

impl Capability {
    /// All scored capabilities.
    pub const ALL: [Capability; 4] = [
        Capability::ToolBinding,
        Capability::Streaming,
        Capability::StructuredOutput,
        Capability::Async,
    ];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolBinding => "bind_tools",
            Self::Streaming => "streaming",
            Self::StructuredOutput => "structured_output",
            Self::Async => "async",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Call shape of a declared method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodShape {
    /// Blocking call returning a value.
    Sync,
    /// Call returning a future.
    Async,
    /// Call returning a lazy chunk sequence.
    Stream,
    /// A plain attribute that happens to share the method's name.
    Attribute,
}

impl MethodShape {
    /// Whether a member of this shape can be invoked.
    pub fn is_callable(self) -> bool {
        !matches!(self, Self::Attribute)
    }
}

/// Outcome of looking a name up in a [`MethodTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodPresence {
    /// No member of that name.
    Missing,
    /// A member exists but cannot be called.
    NotCallable,
    /// A callable member exists.
    Callable,
}

/// Declared surface of a component type: method name to call shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodTable {
    methods: BTreeMap<String, MethodShape>,
}

impl MethodTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, shape: MethodShape) -> Self {
        self.insert(name, shape);
        self
    }

    /// Declare a method, replacing any previous shape.
    pub fn insert(&mut self, name: impl Into<String>, shape: MethodShape) {
        self.methods.insert(name.into(), shape);
    }

    /// Shape of a declared member, if any.
    pub fn shape(&self, name: &str) -> Option<MethodShape> {
        self.methods.get(name).copied()
    }

    /// Whether a member of this name is declared, callable or not.
    pub fn has(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Look a name up.
    pub fn presence(&self, name: &str) -> MethodPresence {
        match self.shape(name) {
            None => MethodPresence::Missing,
            Some(shape) if shape.is_callable() => MethodPresence::Callable,
            Some(_) => MethodPresence::NotCallable,
        }
    }

    /// Declared names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Number of declared members.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, MethodShape)> for MethodTable {
    fn from_iter<I: IntoIterator<Item = (S, MethodShape)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, shape) in iter {
            table.insert(name, shape);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_lookup() {
        let table = MethodTable::new()
            .with("invoke", MethodShape::Sync)
            .with("stream", MethodShape::Stream)
            .with("bind_tools", MethodShape::Attribute);

        assert_eq!(table.presence("invoke"), MethodPresence::Callable);
        assert_eq!(table.presence("stream"), MethodPresence::Callable);
        assert_eq!(table.presence("bind_tools"), MethodPresence::NotCallable);
        assert_eq!(table.presence("ainvoke"), MethodPresence::Missing);
        assert!(table.has("bind_tools"));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_from_iter_and_names_sorted() {
        let table: MethodTable = [("stream", MethodShape::Stream), ("invoke", MethodShape::Sync)]
            .into_iter()
            .collect();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["invoke", "stream"]);
    }

    #[test]
    fn test_capability_names() {
        assert_eq!(Capability::ALL.len(), 4);
        assert_eq!(Capability::ToolBinding.to_string(), "bind_tools");
        assert_eq!(
            serde_json::to_string(&Capability::StructuredOutput).unwrap(),
            "\"structured_output\""
        );
    }
}
