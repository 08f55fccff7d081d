// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Embedding strategy.

use super::{CapabilityStrategy, Category};
use crate::capability::{Capability, MethodTable};
use crate::component::Component;
use crate::probe::{blocking, guarded, handled, run_probes, ProbeReport, ProbeSet, ScenarioOutcomes};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

const REQUIRED_METHODS: &[&str] = &["embed_documents", "embed_query"];

const OPTIONAL_METHODS: &[&str] = &["aembed_documents", "aembed_query"];

const TEST_DOCUMENTS: [&str; 3] = [
    "This is a test document.",
    "Another test document for embedding.",
    "A third document to test batch embedding.",
];

const CONSISTENCY_QUERIES: [&str; 3] = [
    "Short query",
    "This is a much longer query with more words to test dimension consistency",
    "Medium length query for testing",
];

/// Strategy for embedding components.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddingStrategy;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

async fn probe_embed_documents(instance: &Arc<dyn Component>) -> ProbeReport {
    let mut report = ProbeReport::default();
    let documents = owned(&TEST_DOCUMENTS);
    let count = documents.len();

    match blocking(instance, move |c| c.embed_documents(&documents)).await {
        Ok(embeddings) if embeddings.len() != count => {
            report.error("embed_documents returned wrong number of embeddings");
        }
        Ok(embeddings) if embeddings.iter().any(Vec::is_empty) => {
            report.error("embed_documents returned invalid embedding format");
        }
        Ok(_) => {
            report.metric("documents_embedded", count as f64);
            report.pass();
        }
        Err(e) => report.error(format!("embed_documents test failed: {e}")),
    }
    report
}

async fn probe_embed_query(instance: &Arc<dyn Component>) -> ProbeReport {
    let mut report = ProbeReport::default();

    match blocking(instance, |c| c.embed_query("What is the meaning of life?")).await {
        Ok(embedding) if embedding.is_empty() => {
            report.error("embed_query returned invalid embedding");
        }
        Ok(embedding) => {
            report.metric("embedding_dimension", embedding.len() as f64);
            report.pass();
        }
        Err(e) => report.error(format!("embed_query test failed: {e}")),
    }
    report
}

async fn probe_async_embeddings(instance: &Arc<dyn Component>, methods: &MethodTable) -> ProbeReport {
    let mut report = ProbeReport::default();

    if methods.has("aembed_query") {
        match instance.aembed_query("Async embedding test query").await {
            Ok(embedding) if !embedding.is_empty() => {
                report.supported(Capability::Async);
                report.pass();
                return report;
            }
            Ok(_) => {}
            Err(e) => {
                report.warning(format!("Async embeddings test failed: {e}"));
                return report;
            }
        }
    }

    if methods.has("aembed_documents") {
        let documents = owned(&["Async document embedding test"]);
        match instance.aembed_documents(&documents).await {
            Ok(embeddings) if embeddings.len() == 1 => {
                report.supported(Capability::Async);
                report.pass();
                return report;
            }
            Ok(_) => {}
            Err(e) => {
                report.warning(format!("Async embeddings test failed: {e}"));
                return report;
            }
        }
    }

    report.warning("No async embedding methods available");
    report
}

async fn probe_dimension_consistency(instance: &Arc<dyn Component>) -> ProbeReport {
    let mut report = ProbeReport::default();
    let mut dimensions = BTreeSet::new();

    for query in CONSISTENCY_QUERIES {
        match blocking(instance, move |c| c.embed_query(query)).await {
            Ok(embedding) if !embedding.is_empty() => {
                dimensions.insert(embedding.len());
            }
            Ok(_) => {}
            Err(e) => {
                report.warning(format!("Dimension consistency test failed: {e}"));
                return report;
            }
        }
    }

    if dimensions.len() == 1 {
        report.pass();
    } else {
        report.error(format!("Inconsistent embedding dimensions: {dimensions:?}"));
    }
    report
}

#[async_trait]
impl CapabilityStrategy for EmbeddingStrategy {
    fn category(&self) -> Category {
        Category::Embeddings
    }

    fn required_methods(&self) -> &'static [&'static str] {
        REQUIRED_METHODS
    }

    fn optional_methods(&self) -> &'static [&'static str] {
        OPTIONAL_METHODS
    }

    fn functionality_failure(&self) -> &'static str {
        "Embeddings functionality testing failed"
    }

    async fn probe_functionality(
        &self,
        instance: &Arc<dyn Component>,
        methods: &MethodTable,
    ) -> ProbeSet {
        run_probes(vec![
            guarded("embed_documents", probe_embed_documents(instance)),
            guarded("embed_query", probe_embed_query(instance)),
            guarded("async_embeddings", probe_async_embeddings(instance, methods)),
            guarded("dimension_consistency", probe_dimension_consistency(instance)),
        ])
        .await
    }

    async fn probe_error_scenarios(
        &self,
        instance: &Arc<dyn Component>,
        _methods: &MethodTable,
    ) -> ScenarioOutcomes {
        let mut scenarios = ScenarioOutcomes::new();

        scenarios.insert(
            "handles_empty_documents".to_string(),
            handled(instance, |c| c.embed_documents(&[])).await,
        );
        scenarios.insert(
            "handles_empty_query".to_string(),
            handled(instance, |c| c.embed_query("")).await,
        );
        let large_input = "word ".repeat(50_000);
        scenarios.insert(
            "handles_large_input".to_string(),
            handled(instance, move |c| c.embed_query(&large_input)).await,
        );

        scenarios
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Finding;
    use crate::strategy::test_support::{scripted, table, Script, EMBEDDING_METHODS};

    #[tokio::test]
    async fn test_embedding_probes_pass() {
        let instance = scripted(Script {
            dimensions: vec![16],
            ..Script::default()
        });
        let set = EmbeddingStrategy
            .probe_functionality(&instance, &table(EMBEDDING_METHODS))
            .await;

        assert!(set.iter().all(|(_, r)| r.passed));
        let query = &set.iter().find(|(n, _)| n == "embed_query").unwrap().1;
        assert!(query
            .findings
            .contains(&Finding::Metric("embedding_dimension".into(), 16.0)));
        let docs = &set.iter().find(|(n, _)| n == "embed_documents").unwrap().1;
        assert!(docs
            .findings
            .contains(&Finding::Metric("documents_embedded".into(), 3.0)));
    }

    #[tokio::test]
    async fn test_inconsistent_dimensions_lists_lengths() {
        let instance = scripted(Script {
            dimensions: vec![384, 768, 384],
            ..Script::default()
        });
        let report = probe_dimension_consistency(&instance).await;
        assert!(!report.passed);
        assert_eq!(
            report.findings,
            vec![Finding::Error(
                "Inconsistent embedding dimensions: {384, 768}".into()
            )]
        );
    }

    #[tokio::test]
    async fn test_async_embeddings_absent_is_warning() {
        let instance = scripted(Script::default());
        let methods = table(&EMBEDDING_METHODS[..2]);
        let report = probe_async_embeddings(&instance, &methods).await;
        assert_eq!(
            report.findings,
            vec![Finding::Warning("No async embedding methods available".into())]
        );
    }

    #[tokio::test]
    async fn test_async_documents_alone_sets_async() {
        let instance = scripted(Script::default());
        let methods = table(&EMBEDDING_METHODS[..3]);
        let report = probe_async_embeddings(&instance, &methods).await;
        assert!(report.passed);
        assert_eq!(report.findings, vec![Finding::Supported(Capability::Async)]);
    }

    #[tokio::test]
    async fn test_empty_query_embedding_is_error() {
        let instance = scripted(Script {
            dimensions: vec![0],
            ..Script::default()
        });
        let report = probe_embed_query(&instance).await;
        assert_eq!(
            report.findings,
            vec![Finding::Error("embed_query returned invalid embedding".into())]
        );
        let docs = probe_embed_documents(&instance).await;
        assert_eq!(
            docs.findings,
            vec![Finding::Error(
                "embed_documents returned invalid embedding format".into()
            )]
        );
    }

    #[tokio::test]
    async fn test_embedding_error_scenarios() {
        let instance = scripted(Script::default());
        let scenarios = EmbeddingStrategy
            .probe_error_scenarios(&instance, &table(EMBEDDING_METHODS))
            .await;
        assert_eq!(scenarios.len(), 3);
        assert!(scenarios.values().all(|handled| *handled));
    }
}
