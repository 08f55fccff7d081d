//! End-to-end properties of the test harness, exercised through the public
//! API with hand-built components.

use async_trait::async_trait;
use futures::StreamExt;
use llm_health_core::{
    Category, ChunkStream, Component, ComponentConfig, ComponentError, ComponentType,
    IntegrationTester, MethodShape, MethodTable, ModelInput, ModelOutput, OutputSchema, Result,
    TestResult, ToolSpec,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn llm_surface() -> MethodTable {
    MethodTable::new()
        .with("invoke", MethodShape::Sync)
        .with("ainvoke", MethodShape::Async)
        .with("stream", MethodShape::Stream)
        .with("astream", MethodShape::Stream)
        .with("bind_tools", MethodShape::Sync)
        .with("with_structured_output", MethodShape::Sync)
}

fn embedding_surface() -> MethodTable {
    MethodTable::new()
        .with("embed_documents", MethodShape::Sync)
        .with("embed_query", MethodShape::Sync)
        .with("aembed_documents", MethodShape::Async)
        .with("aembed_query", MethodShape::Async)
}

/// Component type built from closures, so each test states only what differs.
struct TypeOf<F> {
    name: &'static str,
    methods: MethodTable,
    build: F,
}

impl<F> ComponentType for TypeOf<F>
where
    F: Fn() -> Result<Arc<dyn Component>> + Send + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    fn method_table(&self) -> MethodTable {
        self.methods.clone()
    }

    fn instantiate(&self, _config: &ComponentConfig) -> Result<Arc<dyn Component>> {
        (self.build)()
    }
}

fn type_of<F>(name: &'static str, methods: MethodTable, build: F) -> Arc<dyn ComponentType>
where
    F: Fn() -> Result<Arc<dyn Component>> + Send + Sync + 'static,
{
    Arc::new(TypeOf {
        name,
        methods,
        build,
    })
}

async fn run(category: Category, component: Arc<dyn ComponentType>) -> TestResult {
    IntegrationTester::new(category, component, ComponentConfig::new())
        .run_all_tests()
        .await
}

fn assert_bounded(result: &TestResult) {
    assert!(
        (0.0..=1.0).contains(&result.compatibility_score),
        "score out of range: {}",
        result.compatibility_score
    );
}

/// Every call fails.
struct Failing;

#[async_trait]
impl Component for Failing {
    fn invoke(&self, _input: ModelInput) -> Result<ModelOutput> {
        Err(ComponentError::Provider("rate limited".into()))
    }

    async fn ainvoke(&self, _input: ModelInput) -> Result<ModelOutput> {
        Err(ComponentError::Provider("rate limited".into()))
    }

    fn stream(&self, _input: ModelInput) -> Result<ChunkStream> {
        Err(ComponentError::Provider("rate limited".into()))
    }

    fn bind_tools(&self, _tools: Vec<ToolSpec>) -> Result<Arc<dyn Component>> {
        Err(ComponentError::Provider("rate limited".into()))
    }

    fn with_structured_output(&self, _schema: OutputSchema) -> Result<Arc<dyn Component>> {
        Err(ComponentError::Provider("rate limited".into()))
    }
}

/// Echoes its prompt and streams a fixed number of chunks.
struct Chatty {
    chunks: usize,
    pulled: Arc<AtomicUsize>,
}

#[async_trait]
impl Component for Chatty {
    fn invoke(&self, input: ModelInput) -> Result<ModelOutput> {
        Ok(ModelOutput::text(input.prompt_text().unwrap_or_default()))
    }

    async fn ainvoke(&self, input: ModelInput) -> Result<ModelOutput> {
        self.invoke(input)
    }

    fn stream(&self, _input: ModelInput) -> Result<ChunkStream> {
        let pulled = self.pulled.clone();
        Ok(futures::stream::iter(0..self.chunks)
            .map(move |i| {
                pulled.fetch_add(1, Ordering::SeqCst);
                Ok(ModelOutput::text(i.to_string()))
            })
            .boxed())
    }
}

/// `invoke` panics; everything else is default.
struct Explosive;

impl Component for Explosive {
    fn invoke(&self, _input: ModelInput) -> Result<ModelOutput> {
        panic!("native extension crashed");
    }
}

struct ConstantEmbeddings;

#[async_trait]
impl Component for ConstantEmbeddings {
    fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(documents.iter().map(|_| vec![0.5; 12]).collect())
    }

    fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.5; 12])
    }

    async fn aembed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_query(text)
    }
}

/// A type whose method table itself blows up.
struct BrokenTable;

impl ComponentType for BrokenTable {
    fn name(&self) -> &str {
        "BrokenTable"
    }

    fn method_table(&self) -> MethodTable {
        panic!("table exploded");
    }

    fn instantiate(&self, _config: &ComponentConfig) -> Result<Arc<dyn Component>> {
        Ok(Arc::new(Failing))
    }
}

#[tokio::test]
async fn failing_constructor_still_yields_a_record() {
    for category in Category::ALL {
        let component = type_of(
            "NoKey",
            llm_surface(),
            || Err(ComponentError::Construction("api_key is required".into())),
        );
        let result = run(category, component).await;

        assert_eq!(result.integration_name, "NoKey");
        assert_eq!(result.integration_version, "unknown");
        assert_eq!(result.errors[0], "Instantiation failed: api_key is required");
        assert_eq!(result.supported_count(), 0);
        assert_eq!(result.compatibility_score, 0.0);
    }
}

#[tokio::test]
async fn always_erroring_component_scores_zero() {
    let component = type_of(
        "Failing",
        llm_surface(),
        || Ok(Arc::new(Failing) as Arc<dyn Component>),
    );
    let result = run(Category::Llms, component).await;

    assert!(result
        .errors
        .contains(&"Invoke test failed: Provider error: rate limited".to_string()));
    assert!(result
        .errors
        .contains(&"bind_tools test failed: Provider error: rate limited".to_string()));
    assert_eq!(result.supported_count(), 0);
    assert_eq!(result.compatibility_score, 0.0);
}

#[tokio::test]
async fn empty_surface_reports_every_missing_method() {
    struct Bare;
    impl Component for Bare {}

    let component = type_of(
        "Bare",
        MethodTable::new(),
        || Ok(Arc::new(Bare) as Arc<dyn Component>),
    );
    let result = run(Category::ChatModels, component).await;

    for method in ["invoke", "ainvoke", "stream", "astream", "bind_tools", "with_structured_output"] {
        assert!(
            result.errors.contains(&format!("Missing required method: {method}")),
            "missing error for {method}: {:?}",
            result.errors
        );
    }
    assert!(result
        .warnings
        .contains(&"ainvoke method not available".to_string()));
    assert_bounded(&result);
    assert_eq!(result.compatibility_score, 0.0);
}

#[tokio::test]
async fn unbounded_stream_is_read_at_most_ten_chunks() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let shared = pulled.clone();
    let component = type_of(
        "Chatty",
        llm_surface(),
        move || {
            Ok(Arc::new(Chatty {
                chunks: 1000,
                pulled: shared.clone(),
            }) as Arc<dyn Component>)
        },
    );
    let result = run(Category::Llms, component).await;

    assert!(result.supports_streaming);
    assert_eq!(result.performance_metrics["chunks_received"], 10.0);
    assert_eq!(pulled.load(Ordering::SeqCst), 10);
    assert_bounded(&result);
}

#[tokio::test]
async fn panicking_probe_is_recorded_and_run_continues() {
    let mut methods = MethodTable::new();
    methods.insert("invoke", MethodShape::Sync);
    let component = type_of(
        "Explosive",
        methods,
        || Ok(Arc::new(Explosive) as Arc<dyn Component>),
    );
    let result = run(Category::Llms, component).await;

    assert!(result
        .errors
        .contains(&"invoke probe panicked: native extension crashed".to_string()));
    assert!(result
        .errors
        .contains(&"Missing required method: stream".to_string()));
    assert_bounded(&result);
}

#[tokio::test]
async fn escaped_panic_becomes_execution_failure() {
    let result = run(Category::Llms, Arc::new(BrokenTable)).await;

    assert_eq!(
        result.errors.last().map(String::as_str),
        Some("Test execution failed: panicked during required method check: table exploded")
    );
    assert_eq!(result.compatibility_score, 0.0);
}

#[tokio::test]
async fn embeddings_with_async_query_score_one_flag() {
    let component = type_of(
        "Constant",
        embedding_surface(),
        || Ok(Arc::new(ConstantEmbeddings) as Arc<dyn Component>),
    );
    let result = run(Category::Embeddings, component).await;

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(result.supports_async);
    assert!(!result.supports_streaming);
    assert_eq!(result.performance_metrics["embedding_dimension"], 12.0);
    assert!((result.compatibility_score - 0.175).abs() < 1e-9);
}

#[tokio::test]
async fn repeated_runs_agree_on_everything_but_time() {
    let component = type_of(
        "Chatty",
        llm_surface(),
        || {
            Ok(Arc::new(Chatty {
                chunks: 4,
                pulled: Arc::new(AtomicUsize::new(0)),
            }) as Arc<dyn Component>)
        },
    );
    let mut tester = IntegrationTester::new(Category::ChatModels, component, ComponentConfig::new());

    let first = tester.run_all_tests().await;
    let second = tester.run_all_tests().await;

    assert_eq!(first.errors, second.errors);
    assert_eq!(first.warnings, second.warnings);
    assert_eq!(first.supports_streaming, second.supports_streaming);
    assert_eq!(first.supports_async, second.supports_async);
    assert_eq!(first.compatibility_score, second.compatibility_score);
    assert_eq!(
        first.performance_metrics.keys().collect::<Vec<_>>(),
        second.performance_metrics.keys().collect::<Vec<_>>()
    );
}

/// A type whose own identity accessors fail.
struct Nameless;

impl ComponentType for Nameless {
    fn name(&self) -> &str {
        panic!("name lookup crashed")
    }

    fn version(&self) -> Option<&str> {
        panic!("version lookup crashed")
    }

    fn method_table(&self) -> MethodTable {
        llm_surface()
    }

    fn instantiate(&self, _config: &ComponentConfig) -> Result<Arc<dyn Component>> {
        Ok(Arc::new(Failing))
    }
}

#[tokio::test]
async fn panicking_identity_falls_back_to_placeholders() {
    let result = run(Category::Llms, Arc::new(Nameless)).await;

    assert_eq!(result.integration_name, llm_health_core::result::UNKNOWN_INTEGRATION);
    assert_eq!(result.integration_version, llm_health_core::result::UNKNOWN_VERSION);
    assert!(result
        .errors
        .contains(&"Invoke test failed: Provider error: rate limited".to_string()));
    assert_bounded(&result);
}
