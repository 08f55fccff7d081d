// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Contract implemented by pluggable model components.
//!
//! A [`ComponentType`] plays the role of a constructible class: it names the
//! integration, declares its [`MethodTable`] and builds [`Component`]
//! instances from an opaque configuration map. Every [`Component`] method
//! has a default body returning [`ComponentError::Unsupported`], so an
//! adapter only implements what it actually offers.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use llm_health_core::component::{Component, ComponentConfig, ComponentType, ModelInput, ModelOutput};
//! use llm_health_core::capability::{MethodShape, MethodTable};
//! use llm_health_core::error::Result;
//!
//! struct Echo;
//!
//! impl Component for Echo {
//!     fn invoke(&self, input: ModelInput) -> Result<ModelOutput> {
//!         Ok(ModelOutput::text(input.prompt_text().unwrap_or_default()))
//!     }
//! }
//!
//! struct EchoType;
//!
//! impl ComponentType for EchoType {
//!     fn name(&self) -> &str {
//!         "Echo"
//!     }
//!
//!     fn method_table(&self) -> MethodTable {
//!         MethodTable::new().with("invoke", MethodShape::Sync)
//!     }
//!
//!     fn instantiate(&self, _config: &ComponentConfig) -> Result<Arc<dyn Component>> {
//!         Ok(Arc::new(Echo))
//!     }
//! }
//! ```

use crate::capability::MethodTable;
use crate::error::{ComponentError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Constructor arguments forwarded verbatim to [`ComponentType::instantiate`].
pub type ComponentConfig = serde_json::Map<String, serde_json::Value>;

/// Lazy, possibly unbounded sequence of output chunks.
pub type ChunkStream = BoxStream<'static, Result<ModelOutput>>;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Instructions for the model.
    System,
    /// End-user turn.
    Human,
    /// Model turn.
    Ai,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Speaker
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// System message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User message.
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    /// Model message.
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }
}

/// Input accepted by generation methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ModelInput {
    /// Single prompt string.
    Text(String),
    /// Ordered chat messages.
    Messages(Vec<Message>),
    /// Arbitrary payload, used to feed malformed input.
    Raw(serde_json::Value),
}

impl ModelInput {
    /// Prompt string input.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self::Text(prompt.into())
    }

    /// Text carried by the input: the prompt, or message contents joined by
    /// newlines. `None` for raw payloads.
    pub fn prompt_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Messages(messages) => Some(
                messages
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Self::Raw(_) => None,
        }
    }
}

impl From<&str> for ModelInput {
    fn from(prompt: &str) -> Self {
        Self::text(prompt)
    }
}

impl From<Vec<Message>> for ModelInput {
    fn from(messages: Vec<Message>) -> Self {
        Self::Messages(messages)
    }
}

/// A tool call emitted by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name
    pub name: String,
    /// Arguments as JSON
    pub arguments: serde_json::Value,
}

/// Output of a generation call or a single streamed chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    /// Generated text
    pub content: String,
    /// Tool calls requested by the model
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Parsed structured payload, when bound to a schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<serde_json::Value>,
}

impl ModelOutput {
    /// Plain text output.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Structured output.
    pub fn structured(value: serde_json::Value) -> Self {
        Self {
            content: value.to_string(),
            structured: Some(value),
            ..Default::default()
        }
    }

    /// Whether the output carries nothing at all.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.tool_calls.is_empty() && self.structured.is_none()
    }
}

/// Tool description handed to [`Component::bind_tools`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema of the arguments
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    /// Create a tool description.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Primitive type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// JSON string
    String,
    /// JSON number
    Number,
    /// JSON boolean
    Boolean,
}

impl FieldKind {
    fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &serde_json::Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// A named field of an [`OutputSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name
    pub name: String,
    /// Field type
    pub kind: FieldKind,
}

/// Flat object schema handed to [`Component::with_structured_output`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Schema title
    pub name: String,
    /// Required fields
    pub fields: Vec<SchemaField>,
}

impl OutputSchema {
    /// Create an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field declaration.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(SchemaField {
            name: name.into(),
            kind,
        });
        self
    }

    /// Render as a JSON schema object.
    pub fn to_json_schema(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), serde_json::json!({ "type": f.kind.json_type() })))
            .collect();
        let required: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();

        serde_json::json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Whether `value` is an object carrying every field with the right type.
    pub fn validate(&self, value: &serde_json::Value) -> bool {
        let Some(object) = value.as_object() else {
            return false;
        };
        self.fields.iter().all(|f| {
            object
                .get(&f.name)
                .map(|v| f.kind.accepts(v))
                .unwrap_or(false)
        })
    }
}

/// A live instance of a component under test.
///
/// The synchronous methods may block. The harness calls them on tokio's
/// blocking pool.
#[async_trait]
pub trait Component: Send + Sync {
    /// Synchronous single-input generation.
    fn invoke(&self, _input: ModelInput) -> Result<ModelOutput> {
        Err(ComponentError::unsupported("invoke"))
    }

    /// Asynchronous single-input generation.
    async fn ainvoke(&self, _input: ModelInput) -> Result<ModelOutput> {
        Err(ComponentError::unsupported("ainvoke"))
    }

    /// Streamed generation. The returned stream may be unbounded.
    fn stream(&self, _input: ModelInput) -> Result<ChunkStream> {
        Err(ComponentError::unsupported("stream"))
    }

    /// Return a copy of this component with `tools` bound.
    fn bind_tools(&self, _tools: Vec<ToolSpec>) -> Result<Arc<dyn Component>> {
        Err(ComponentError::unsupported("bind_tools"))
    }

    /// Return a copy of this component constrained to `schema`.
    fn with_structured_output(&self, _schema: OutputSchema) -> Result<Arc<dyn Component>> {
        Err(ComponentError::unsupported("with_structured_output"))
    }

    /// Embed a batch of documents.
    fn embed_documents(&self, _documents: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(ComponentError::unsupported("embed_documents"))
    }

    /// Embed a single query.
    fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
        Err(ComponentError::unsupported("embed_query"))
    }

    /// Asynchronously embed a batch of documents.
    async fn aembed_documents(&self, _documents: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(ComponentError::unsupported("aembed_documents"))
    }

    /// Asynchronously embed a single query.
    async fn aembed_query(&self, _text: &str) -> Result<Vec<f32>> {
        Err(ComponentError::unsupported("aembed_query"))
    }
}

/// A constructible component type, as supplied by the registry.
pub trait ComponentType: Send + Sync {
    /// Integration name, e.g. `ChatOpenAI`.
    fn name(&self) -> &str;

    /// Origin of the integration (package or module path).
    fn module(&self) -> &str {
        ""
    }

    /// Integration version, if known.
    fn version(&self) -> Option<&str> {
        None
    }

    /// Declared method surface.
    fn method_table(&self) -> MethodTable;

    /// Build an instance from constructor arguments.
    fn instantiate(&self, config: &ComponentConfig) -> Result<Arc<dyn Component>>;
}
