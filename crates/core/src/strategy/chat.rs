// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chat-model strategy: message-oriented probes plus every text-generation
//! probe.

use super::{CapabilityStrategy, Category, TextGenerationStrategy};
use crate::capability::MethodTable;
use crate::component::{Component, Message, ModelInput};
use crate::probe::{blocking, guarded, handled, run_probes, ProbeReport, ProbeSet, ScenarioOutcomes};
use async_trait::async_trait;
use std::sync::Arc;

const REQUIRED_METHODS: &[&str] = &[
    "invoke",
    "ainvoke",
    "stream",
    "astream",
    "bind_tools",
    "with_structured_output",
];

const OPTIONAL_METHODS: &[&str] = &[
    "batch",
    "abatch",
    "bind",
    "with_config",
    "get_num_tokens",
    "get_token_ids",
];

/// Strategy for chat-style components.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatStrategy {
    base: TextGenerationStrategy,
}

/// Invoke with `messages`; empty output warns, failure errors.
async fn probe_messages(
    instance: &Arc<dyn Component>,
    messages: Vec<Message>,
    empty_warning: &str,
    failure: &str,
) -> ProbeReport {
    let mut report = ProbeReport::default();
    match blocking(instance, move |c| c.invoke(ModelInput::Messages(messages))).await {
        Ok(output) if !output.is_empty() => report.pass(),
        Ok(_) => report.warning(empty_warning),
        Err(e) => report.error(format!("{failure}: {e}")),
    }
    report
}

async fn probe_message_handling(instance: &Arc<dyn Component>) -> ProbeReport {
    probe_messages(
        instance,
        vec![Message::human("Hello, how are you?")],
        "Message handling returned invalid response format",
        "Message handling test failed",
    )
    .await
}

async fn probe_system_message(instance: &Arc<dyn Component>) -> ProbeReport {
    probe_messages(
        instance,
        vec![
            Message::system("You are a helpful assistant."),
            Message::human("What is 2+2?"),
        ],
        "System message support test returned no response",
        "System message support test failed",
    )
    .await
}

async fn probe_conversation(instance: &Arc<dyn Component>) -> ProbeReport {
    probe_messages(
        instance,
        vec![
            Message::human("My name is Alice."),
            Message::human("What is my name?"),
        ],
        "Conversation handling test returned no response",
        "Conversation handling test failed",
    )
    .await
}

#[async_trait]
impl CapabilityStrategy for ChatStrategy {
    fn category(&self) -> Category {
        Category::ChatModels
    }

    fn required_methods(&self) -> &'static [&'static str] {
        REQUIRED_METHODS
    }

    fn optional_methods(&self) -> &'static [&'static str] {
        OPTIONAL_METHODS
    }

    fn functionality_failure(&self) -> &'static str {
        "Chat model functionality testing failed"
    }

    async fn probe_functionality(
        &self,
        instance: &Arc<dyn Component>,
        methods: &MethodTable,
    ) -> ProbeSet {
        let mut probes = vec![
            guarded("message_handling", probe_message_handling(instance)),
            guarded("system_message", probe_system_message(instance)),
            guarded("conversation", probe_conversation(instance)),
        ];
        probes.extend(self.base.probes(instance, methods));
        run_probes(probes).await
    }

    async fn probe_error_scenarios(
        &self,
        instance: &Arc<dyn Component>,
        _methods: &MethodTable,
    ) -> ScenarioOutcomes {
        let mut scenarios = ScenarioOutcomes::new();

        scenarios.insert(
            "handles_invalid_message_format".to_string(),
            handled(instance, |c| c.invoke(ModelInput::text("invalid_message_format"))).await,
        );
        scenarios.insert(
            "handles_empty_messages".to_string(),
            handled(instance, |c| c.invoke(ModelInput::Messages(Vec::new()))).await,
        );
        scenarios.insert(
            "handles_malformed_messages".to_string(),
            handled(instance, |c| {
                c.invoke(ModelInput::Raw(serde_json::json!([{ "invalid": "message" }])))
            })
            .await,
        );

        scenarios
    }
}
