// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Deterministic mock integrations.
//!
//! These stand in for provider-backed models so the harness, the CLI and
//! the reports can be exercised without network access or API keys. Every
//! response is a pure function of the input.

use async_trait::async_trait;
use futures::StreamExt;
use llm_health_core::component::{FieldKind, ToolCall};
use llm_health_core::{
    ChunkStream, Component, ComponentConfig, ComponentError, ModelInput, ModelOutput,
    OutputSchema, Result, ToolSpec,
};
use std::sync::Arc;

/// Default embedding width, matching common sentence-transformer models.
pub const DEFAULT_DIMENSION: usize = 384;

const PROMPT_PREVIEW_CHARS: usize = 40;

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PROMPT_PREVIEW_CHARS).collect();
    if text.chars().count() > PROMPT_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

fn string_option(config: &ComponentConfig, key: &str) -> Result<Option<String>> {
    match config.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ComponentError::Construction(format!(
            "{key} must be a string, got {other}"
        ))),
    }
}

/// Flavour of a mock generation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStyle {
    /// Completion model: replies to the whole prompt.
    Completion,
    /// Chat model: replies to the last message.
    Chat,
}

/// Mock text-generation or chat model.
#[derive(Debug, Clone)]
pub struct MockModel {
    style: ModelStyle,
    response: Option<String>,
    tools: Vec<ToolSpec>,
}

impl MockModel {
    /// Create a model of `style` with the default reply.
    pub fn new(style: ModelStyle) -> Self {
        Self {
            style,
            response: None,
            tools: Vec::new(),
        }
    }

    /// Always reply with `response`.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Constructor for the built-in `MockLLM` type.
    pub fn llm(config: &ComponentConfig) -> Result<Arc<dyn Component>> {
        Self::from_config(ModelStyle::Completion, config)
    }

    /// Constructor for the built-in `MockChatModel` type.
    pub fn chat(config: &ComponentConfig) -> Result<Arc<dyn Component>> {
        Self::from_config(ModelStyle::Chat, config)
    }

    fn from_config(style: ModelStyle, config: &ComponentConfig) -> Result<Arc<dyn Component>> {
        let mut model = Self::new(style);
        model.response = string_option(config, "response")?;
        Ok(Arc::new(model))
    }

    fn prompt(&self, input: &ModelInput) -> Result<String> {
        let prompt = match (self.style, input) {
            (ModelStyle::Chat, ModelInput::Messages(messages)) => messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default(),
            (_, ModelInput::Raw(_)) => {
                return Err(ComponentError::InvalidInput(
                    "expected a prompt or a list of messages".into(),
                ))
            }
            _ => input.prompt_text().unwrap_or_default(),
        };

        if prompt.trim().is_empty() {
            return Err(ComponentError::InvalidInput("prompt is empty".into()));
        }
        Ok(prompt)
    }

    fn respond(&self, input: &ModelInput) -> Result<ModelOutput> {
        let prompt = self.prompt(input)?;

        if let Some(tool) = self.tools.first() {
            return Ok(ModelOutput {
                content: String::new(),
                tool_calls: vec![ToolCall {
                    name: tool.name.clone(),
                    arguments: serde_json::json!({ "query": preview(&prompt) }),
                }],
                structured: None,
            });
        }

        let content = match (&self.response, self.style) {
            (Some(response), _) => response.clone(),
            (None, ModelStyle::Completion) => format!("Mock response to: {}", preview(&prompt)),
            (None, ModelStyle::Chat) => format!("Mock chat reply to: {}", preview(&prompt)),
        };
        Ok(ModelOutput::text(content))
    }
}

#[async_trait]
impl Component for MockModel {
    fn invoke(&self, input: ModelInput) -> Result<ModelOutput> {
        self.respond(&input)
    }

    async fn ainvoke(&self, input: ModelInput) -> Result<ModelOutput> {
        self.respond(&input)
    }

    fn stream(&self, input: ModelInput) -> Result<ChunkStream> {
        let output = self.respond(&input)?;
        let words: Vec<String> = output
            .content
            .split_inclusive(' ')
            .map(str::to_string)
            .collect();
        Ok(futures::stream::iter(words)
            .map(|word| Ok(ModelOutput::text(word)))
            .boxed())
    }

    fn bind_tools(&self, tools: Vec<ToolSpec>) -> Result<Arc<dyn Component>> {
        if tools.is_empty() {
            return Err(ComponentError::InvalidInput("no tools to bind".into()));
        }
        let mut bound = self.clone();
        bound.tools = tools;
        Ok(Arc::new(bound))
    }

    fn with_structured_output(&self, schema: OutputSchema) -> Result<Arc<dyn Component>> {
        if schema.fields.is_empty() {
            return Err(ComponentError::InvalidInput("schema has no fields".into()));
        }
        Ok(Arc::new(MockStructured {
            model: self.clone(),
            schema,
        }))
    }
}

/// A mock model constrained to an output schema.
#[derive(Debug, Clone)]
struct MockStructured {
    model: MockModel,
    schema: OutputSchema,
}

impl MockStructured {
    fn respond(&self, input: &ModelInput) -> Result<ModelOutput> {
        self.model.prompt(input)?;
        let value: serde_json::Map<String, serde_json::Value> = self
            .schema
            .fields
            .iter()
            .map(|field| {
                let sample = match field.kind {
                    FieldKind::String => serde_json::json!("test"),
                    FieldKind::Number => serde_json::json!(0.9),
                    FieldKind::Boolean => serde_json::json!(true),
                };
                (field.name.clone(), sample)
            })
            .collect();
        Ok(ModelOutput::structured(serde_json::Value::Object(value)))
    }
}

#[async_trait]
impl Component for MockStructured {
    fn invoke(&self, input: ModelInput) -> Result<ModelOutput> {
        self.respond(&input)
    }

    async fn ainvoke(&self, input: ModelInput) -> Result<ModelOutput> {
        self.respond(&input)
    }
}

/// Mock embedding model producing unit-length, text-seeded vectors.
#[derive(Debug, Clone)]
pub struct MockEmbeddings {
    dimension: usize,
}

impl MockEmbeddings {
    /// Create a model emitting `dimension`-wide vectors.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Constructor for the built-in `MockEmbeddings` type. Reads an optional
    /// positive integer `dimension`.
    pub fn from_config(config: &ComponentConfig) -> Result<Arc<dyn Component>> {
        let dimension = match config.get("dimension") {
            None | Some(serde_json::Value::Null) => DEFAULT_DIMENSION,
            Some(value) => value
                .as_u64()
                .filter(|d| *d > 0)
                .map(|d| d as usize)
                .ok_or_else(|| {
                    ComponentError::Construction(format!(
                        "dimension must be a positive integer, got {value}"
                    ))
                })?,
        };
        Ok(Arc::new(Self::new(dimension)))
    }

    /// Width of produced vectors.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(ComponentError::InvalidInput("cannot embed empty text".into()));
        }

        // FNV-1a seed, then xorshift per component.
        let mut state = text.bytes().fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        });
        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state % 2001) as f32 / 1000.0 - 1.0
            })
            .collect();

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }
}

#[async_trait]
impl Component for MockEmbeddings {
    fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f32>>> {
        documents.iter().map(|d| self.embed(d)).collect()
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text)
    }

    async fn aembed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed_documents(documents)
    }

    async fn aembed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_health_core::Message;

    #[test]
    fn test_completion_reply() {
        let model = MockModel::new(ModelStyle::Completion);
        let output = model.invoke(ModelInput::text("Hello there")).unwrap();
        assert_eq!(output.content, "Mock response to: Hello there");
        assert!(model.invoke(ModelInput::text("")).is_err());
        assert!(model
            .invoke(ModelInput::Raw(serde_json::json!([{ "invalid": "message" }])))
            .is_err());
    }

    #[test]
    fn test_chat_replies_to_last_message() {
        let model = MockModel::new(ModelStyle::Chat);
        let output = model
            .invoke(ModelInput::Messages(vec![
                Message::system("Be brief."),
                Message::human("What is 2+2?"),
            ]))
            .unwrap();
        assert_eq!(output.content, "Mock chat reply to: What is 2+2?");
        assert!(model.invoke(ModelInput::Messages(vec![])).is_err());
    }

    #[test]
    fn test_long_prompt_is_previewed() {
        let model = MockModel::new(ModelStyle::Completion);
        let output = model.invoke(ModelInput::Text("test ".repeat(10_000))).unwrap();
        assert!(output.content.ends_with("..."));
        assert!(output.content.len() < 100);
    }

    #[tokio::test]
    async fn test_stream_reassembles_reply() {
        let model = MockModel::new(ModelStyle::Completion).with_response("one two three");
        let chunks: Vec<String> = model
            .stream(ModelInput::text("go"))
            .unwrap()
            .map(|chunk| chunk.unwrap().content)
            .collect()
            .await;
        assert_eq!(chunks, vec!["one ", "two ", "three"]);
    }

    #[test]
    fn test_bound_tools_produce_tool_calls() {
        let model = MockModel::new(ModelStyle::Chat);
        assert!(model.bind_tools(vec![]).is_err());

        let tool = ToolSpec::new("calc", "adds", serde_json::json!({}));
        let bound = model.bind_tools(vec![tool]).unwrap();
        let output = bound.invoke(ModelInput::text("What is 5 + 3?")).unwrap();
        assert_eq!(output.tool_calls[0].name, "calc");
        assert!(!output.is_empty());
    }

    #[test]
    fn test_structured_output_matches_schema() {
        let schema = OutputSchema::new("Answer")
            .field("answer", FieldKind::String)
            .field("confidence", FieldKind::Number)
            .field("final", FieldKind::Boolean);
        let structured = MockModel::new(ModelStyle::Completion)
            .with_structured_output(schema.clone())
            .unwrap();
        let output = structured.invoke(ModelInput::text("respond")).unwrap();
        assert!(schema.validate(output.structured.as_ref().unwrap()));
    }

    #[test]
    fn test_embeddings_are_deterministic_unit_vectors() {
        let model = MockEmbeddings::new(32);
        let a = model.embed_query("hello").unwrap();
        let b = model.embed_query("hello").unwrap();
        let c = model.embed_query("goodbye").unwrap();

        assert_eq!(a.len(), 32);
        assert_eq!(a, b);
        assert_ne!(a, c);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
        assert!(model.embed_query("").is_err());
        assert!(model.embed_documents(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_embeddings_config() {
        let mut config = ComponentConfig::new();
        config.insert("dimension".into(), serde_json::json!(16));
        let model = MockEmbeddings::from_config(&config).unwrap();
        assert_eq!(model.embed_query("x").unwrap().len(), 16);

        config.insert("dimension".into(), serde_json::json!("wide"));
        let err = MockEmbeddings::from_config(&config).err().unwrap();
        assert!(matches!(err, ComponentError::Construction(_)));

        let default = MockEmbeddings::from_config(&ComponentConfig::new()).unwrap();
        assert_eq!(default.embed_query("x").unwrap().len(), DEFAULT_DIMENSION);
    }
}
