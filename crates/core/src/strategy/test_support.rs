// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scripted components for strategy and harness unit tests.

use crate::capability::{MethodShape, MethodTable};
use crate::component::{
    ChunkStream, Component, ComponentConfig, ComponentType, ModelInput, ModelOutput, OutputSchema,
    ToolSpec,
};
use crate::error::{ComponentError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Full LLM surface.
pub(crate) const LLM_METHODS: &[(&str, MethodShape)] = &[
    ("invoke", MethodShape::Sync),
    ("ainvoke", MethodShape::Async),
    ("stream", MethodShape::Stream),
    ("astream", MethodShape::Stream),
    ("bind_tools", MethodShape::Sync),
    ("with_structured_output", MethodShape::Sync),
];

/// Full embeddings surface.
pub(crate) const EMBEDDING_METHODS: &[(&str, MethodShape)] = &[
    ("embed_documents", MethodShape::Sync),
    ("embed_query", MethodShape::Sync),
    ("aembed_documents", MethodShape::Async),
    ("aembed_query", MethodShape::Async),
];

pub(crate) fn table(methods: &[(&str, MethodShape)]) -> MethodTable {
    methods.iter().map(|(n, s)| (*n, *s)).collect()
}

/// Behaviour knobs for [`Scripted`].
#[derive(Clone)]
pub(crate) struct Script {
    pub reply: std::result::Result<String, String>,
    pub stream_chunks: usize,
    pub tool_execution_fails: bool,
    pub structured_fails: bool,
    pub dimensions: Vec<usize>,
    pub rejects_empty: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            reply: Ok("scripted reply".to_string()),
            stream_chunks: 3,
            tool_execution_fails: false,
            structured_fails: false,
            dimensions: vec![8],
            rejects_empty: false,
        }
    }
}

/// A [`Scripted`] instance behind the trait object the strategies take.
pub(crate) fn scripted(script: Script) -> Arc<dyn Component> {
    Arc::new(Scripted::new(script))
}

pub(crate) struct Scripted {
    pub script: Script,
    pub chunks_pulled: Arc<AtomicUsize>,
    query_calls: AtomicUsize,
}

impl Scripted {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            chunks_pulled: Arc::new(AtomicUsize::new(0)),
            query_calls: AtomicUsize::new(0),
        }
    }

    fn reply(&self, input: &ModelInput) -> Result<ModelOutput> {
        if self.script.rejects_empty && input.prompt_text().map_or(true, |t| t.is_empty()) {
            return Err(ComponentError::InvalidInput("empty prompt".into()));
        }
        self.script
            .reply
            .clone()
            .map(ModelOutput::text)
            .map_err(ComponentError::Provider)
    }

    fn vector(&self, dimension: usize) -> Vec<f32> {
        (0..dimension).map(|i| i as f32 / 10.0).collect()
    }
}

#[async_trait]
impl Component for Scripted {
    fn invoke(&self, input: ModelInput) -> Result<ModelOutput> {
        self.reply(&input)
    }

    async fn ainvoke(&self, input: ModelInput) -> Result<ModelOutput> {
        self.reply(&input)
    }

    fn stream(&self, _input: ModelInput) -> Result<ChunkStream> {
        let pulled = self.chunks_pulled.clone();
        let total = self.script.stream_chunks;
        Ok(futures::stream::iter(0..total)
            .map(move |i| {
                pulled.fetch_add(1, Ordering::SeqCst);
                Ok(ModelOutput::text(format!("chunk-{i}")))
            })
            .boxed())
    }

    fn bind_tools(&self, _tools: Vec<ToolSpec>) -> Result<Arc<dyn Component>> {
        let mut script = self.script.clone();
        if script.tool_execution_fails {
            script.reply = Err("tool call rejected".into());
        }
        Ok(Arc::new(Scripted::new(script)))
    }

    fn with_structured_output(&self, schema: OutputSchema) -> Result<Arc<dyn Component>> {
        Ok(Arc::new(Structured {
            schema,
            fails: self.script.structured_fails,
        }))
    }

    fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f32>>> {
        let dimension = self.script.dimensions[0];
        Ok(documents.iter().map(|_| self.vector(dimension)).collect())
    }

    fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
        let call = self.query_calls.fetch_add(1, Ordering::SeqCst);
        let dims = &self.script.dimensions;
        Ok(self.vector(dims[call % dims.len()]))
    }

    async fn aembed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed_documents(documents)
    }

    async fn aembed_query(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(self.script.dimensions[0]))
    }
}

struct Structured {
    schema: OutputSchema,
    fails: bool,
}

impl Component for Structured {
    fn invoke(&self, _input: ModelInput) -> Result<ModelOutput> {
        if self.fails {
            return Err(ComponentError::Provider("schema parse failed".into()));
        }
        let mut value = serde_json::Map::new();
        for field in &self.schema.fields {
            let sample = match field.kind {
                crate::component::FieldKind::String => serde_json::json!("test"),
                crate::component::FieldKind::Number => serde_json::json!(0.9),
                crate::component::FieldKind::Boolean => serde_json::json!(true),
            };
            value.insert(field.name.clone(), sample);
        }
        Ok(ModelOutput::structured(serde_json::Value::Object(value)))
    }
}

/// Component type wrapper with a configurable surface and constructor.
pub(crate) struct ScriptedType {
    pub name: String,
    pub methods: MethodTable,
    pub script: Script,
    pub construction_error: Option<String>,
    pub constructions: AtomicUsize,
}

impl ScriptedType {
    pub fn new(name: &str, methods: MethodTable, script: Script) -> Self {
        Self {
            name: name.to_string(),
            methods,
            script,
            construction_error: None,
            constructions: AtomicUsize::new(0),
        }
    }

    pub fn failing_constructor(mut self, cause: &str) -> Self {
        self.construction_error = Some(cause.to_string());
        self
    }
}

impl ComponentType for ScriptedType {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<&str> {
        Some("0.0.1-test")
    }

    fn method_table(&self) -> MethodTable {
        self.methods.clone()
    }

    fn instantiate(&self, _config: &ComponentConfig) -> Result<Arc<dyn Component>> {
        self.constructions.fetch_add(1, Ordering::SeqCst);
        if let Some(cause) = &self.construction_error {
            return Err(ComponentError::Construction(cause.clone()));
        }
        Ok(Arc::new(Scripted::new(self.script.clone())))
    }
}
