//! Integration tests for the LLM clients and the bug injector.
//!
//! Tests marked `#[ignore]` make real API calls to OpenRouter.
//! Run with: OPENROUTER_API_KEY=your_key cargo test --test llm_integration -- --ignored

use std::sync::Arc;

use bug_forge::corpus::Problem;
use bug_forge::injection::{BugInjector, LlmBugInjector};
use bug_forge::llm::{GenerationRequest, LiteLlmClient, LlmProvider, Message, OpenRouterProvider};
use bug_forge::LlmError;

const TEST_MODEL: &str = "openai/gpt-4o-mini";

fn get_test_api_key() -> String {
    std::env::var("OPENROUTER_API_KEY")
        .expect("OPENROUTER_API_KEY environment variable must be set for integration tests")
}

fn create_test_provider() -> OpenRouterProvider {
    OpenRouterProvider::with_model(get_test_api_key(), TEST_MODEL.to_string())
        .expect("provider should build")
}

fn add_problem() -> Problem {
    Problem::new(
        "task_1",
        "def add(a, b):\n    \"\"\"Return the sum of a and b.\"\"\"\n",
        "    return a + b\n",
        "def check(candidate):\n    assert candidate(1, 2) == 3\n    assert candidate(-1, 1) == 0\n",
        "add",
    )
}

#[tokio::test]
#[ignore] // Run with: cargo test --test llm_integration -- --ignored
async fn test_simple_generation() {
    let provider = create_test_provider();

    let request = GenerationRequest::new(
        TEST_MODEL,
        vec![
            Message::system("You are a helpful assistant. Reply concisely."),
            Message::user("What is 2 + 2? Reply with just the number."),
        ],
    )
    .with_max_tokens(10)
    .with_temperature(0.0);

    let response = provider.generate(request).await;
    assert!(response.is_ok(), "Generation failed: {:?}", response.err());

    let response = response.expect("Should have response");
    let content = response.first_content().expect("Should have content");
    assert!(
        content.contains('4'),
        "Response should contain '4', got: {}",
        content
    );
}

#[tokio::test]
#[ignore]
async fn test_structured_bug_injection() {
    let provider: Arc<dyn LlmProvider> = Arc::new(create_test_provider());
    let injector = LlmBugInjector::new(provider, TEST_MODEL);

    let injection = injector
        .inject(&add_problem())
        .await
        .expect("injection should succeed");

    assert!(!injection.buggy_code.trim().is_empty());
    assert!(!injection.bug_explanation.trim().is_empty());
    assert!(
        !injection.buggy_code.contains("def add"),
        "Body should not repeat the signature, got: {}",
        injection.buggy_code
    );
}

#[tokio::test]
async fn test_invalid_api_key() {
    let provider = OpenRouterProvider::with_custom_url(
        "invalid-key".to_string(),
        "http://127.0.0.1:9".to_string(),
        TEST_MODEL.to_string(),
    )
    .expect("provider should build");

    let request = GenerationRequest::new(TEST_MODEL, vec![Message::user("test")]).with_max_tokens(5);

    let response = provider.generate(request).await;
    assert!(response.is_err(), "Should fail against an unreachable endpoint");
}

#[tokio::test]
async fn test_injector_surfaces_transport_errors() {
    let client = LiteLlmClient::new(
        "http://127.0.0.1:9".to_string(),
        None,
        "gpt-4o-mini".to_string(),
    )
    .expect("client should build");
    let injector = LlmBugInjector::new(Arc::new(client), "gpt-4o-mini");

    let err = injector
        .inject(&add_problem())
        .await
        .expect_err("unreachable endpoint must fail");
    assert!(
        matches!(err, bug_forge::GenerationError::Llm(LlmError::RequestFailed(_))),
        "unexpected error: {:?}",
        err
    );
}
