//! The built-in integrations run cleanly through the full harness.

use llm_health_adapters::{ComponentRegistry, HealthConfig};
use llm_health_core::{Category, IntegrationTester, SuiteEntry, TestSuite};

#[tokio::test]
async fn builtin_mocks_pass_every_probe() {
    let registry = ComponentRegistry::builtin();
    let config = HealthConfig::default();

    let mut suite = TestSuite::new(config.suite_options());
    for (category, component) in registry.select(None, None) {
        let args = config.integration_config(component.name());
        suite.add(SuiteEntry::new(category, component, args));
    }
    let results = suite.run().await;

    assert_eq!(results.len(), 3);
    for result in &results {
        assert!(result.errors.is_empty(), "{}: {:?}", result.integration_name, result.errors);
        assert!(result.warnings.is_empty(), "{}: {:?}", result.integration_name, result.warnings);
    }

    let score = |name: &str| {
        results
            .iter()
            .find(|r| r.integration_name == name)
            .map(|r| r.compatibility_score)
            .unwrap()
    };
    assert_eq!(score("MockLLM"), 0.7);
    assert_eq!(score("MockChatModel"), 0.7);
    assert!((score("MockEmbeddings") - 0.175).abs() < 1e-9);
}

#[tokio::test]
async fn chat_mock_reports_every_scenario() {
    let registry = ComponentRegistry::builtin();
    let (category, component) = registry
        .select(Some(Category::ChatModels), Some("MockChatModel"))
        .remove(0);

    let mut tester = IntegrationTester::new(category, component, Default::default());
    let result = tester.run_all_tests().await;
    assert!(result.supports_tool_binding && result.supports_structured_output);

    let report = tester.last_report();
    assert!(report.instantiated);
    assert_eq!(report.functionality.len(), 8);
    assert!(report.functionality.values().all(|passed| *passed));
    assert!(report.error_scenarios["handles_invalid_message_format"]);
    assert!(!report.error_scenarios["handles_empty_messages"]);
    assert!(!report.error_scenarios["handles_malformed_messages"]);
}

#[tokio::test]
async fn misconfigured_embeddings_fail_instantiation() {
    let registry = ComponentRegistry::builtin();
    let (category, component) = registry
        .select(Some(Category::Embeddings), None)
        .remove(0);

    let mut args = llm_health_core::ComponentConfig::new();
    args.insert("dimension".into(), serde_json::json!(-4));
    let result = IntegrationTester::new(category, component, args)
        .run_all_tests()
        .await;

    assert!(result.errors[0].starts_with("Instantiation failed: dimension must be a positive integer"));
    assert_eq!(result.compatibility_score, 0.0);
}

#[test]
fn environment_overrides_file_and_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("health.json");
    std::fs::write(&path, r#"{ "test_timeout": 5, "max_concurrency": 2 }"#).unwrap();

    std::env::set_var("LIH_TEST_TIMEOUT", "12");
    std::env::set_var("LIH_MOCK_MODE", "true");
    std::env::set_var("EXAMPLEPROVIDER_API_KEY", "secret");

    let config = HealthConfig::load(Some(&path)).unwrap();
    assert_eq!(config.test_timeout, 12);
    assert_eq!(config.max_concurrency, 2);
    assert!(config.mock_mode);
    assert_eq!(config.api_keys["exampleprovider"], "secret");

    let from_env = HealthConfig::from_env().unwrap();
    assert_eq!(from_env.test_timeout, 12);
    assert_eq!(from_env.max_concurrency, 8);

    std::env::remove_var("LIH_TEST_TIMEOUT");
    std::env::remove_var("LIH_MOCK_MODE");
    std::env::remove_var("EXAMPLEPROVIDER_API_KEY");
}
