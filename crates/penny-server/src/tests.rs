//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use penny_core::test_utils::{MockOllamaServer, MockTavilyServer};
use penny_core::{MockBackend, MockSearchProvider, TavilyClient};
use tower::ServiceExt;

const TAXONOMY: &str = r#"{
    "Food & Dining": {
        "Coffee Shop": {"code": 5814, "description": "Fast food restaurants and coffee shops", "need": "Want"},
        "Grocery": {"code": 5411, "description": "Grocery stores and supermarkets", "need": "Need"}
    },
    "Transport": {
        "Fuel": {"code": 5541, "description": "Service stations", "need": "Need"}
    },
    "Other": {}
}"#;

fn taxonomy() -> Taxonomy {
    Taxonomy::from_json_str(TAXONOMY).unwrap()
}

fn setup_test_app(ai: MockBackend, search: MockSearchProvider) -> Router {
    create_router_with_clients(
        taxonomy(),
        AIClient::Mock(ai),
        SearchClient::Mock(search),
        ServerConfig::default(),
    )
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn suggestion_body(income: i64) -> serde_json::Value {
    serde_json::json!({
        "merchant": "Starbucks",
        "description": "Daily latte",
        "category": "Food & Dining",
        "subcategory": "Coffee Shop",
        "goal": "Save for a bike",
        "income": income
    })
}

// ========== Classification Tests ==========

#[tokio::test]
async fn test_classify_starbucks() {
    let ai = MockBackend::new().with_responses(["Food & Dining", "Coffee Shop"]);
    let search = MockSearchProvider::with_answer("Starbucks is a chain of coffeehouses.");
    let app = setup_test_app(ai, search);

    let response = app
        .oneshot(post_json(
            "/classify",
            &serde_json::json!({"merchant": "Starbucks"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(
        json,
        serde_json::json!({
            "merchant": "Starbucks",
            "description": "Starbucks is a chain of coffeehouses.",
            "general_category": "Food & Dining",
            "subcategory": "Coffee Shop",
            "details": {
                "code": 5814,
                "description": "Fast food restaurants and coffee shops",
                "need": "Want"
            }
        })
    );
}

#[tokio::test]
async fn test_classify_other_returns_placeholder() {
    let ai = MockBackend::new().with_responses(["Other"]);
    let app = setup_test_app(ai.clone(), MockSearchProvider::with_answer("?"));

    let response = app
        .oneshot(post_json("/classify", &serde_json::json!({"merchant": "ZZZ"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["general_category"], "Other");
    assert_eq!(json["subcategory"], "Unknown");
    assert_eq!(
        json["details"],
        serde_json::json!({"code": 0, "description": "Unknown category", "need": "Unidentified"})
    );
    assert_eq!(ai.call_count(), 1);
}

#[tokio::test]
async fn test_classify_search_failure_still_succeeds() {
    let ai = MockBackend::new().with_responses(["Transport", "Fuel"]);
    let app = setup_test_app(ai, MockSearchProvider::failing());

    let response = app
        .oneshot(post_json("/classify", &serde_json::json!({"merchant": "Shell"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["description"], "");
    assert_eq!(json["details"]["code"], 5541);
}

#[tokio::test]
async fn test_classify_llm_failure_is_generic_500() {
    let app = setup_test_app(MockBackend::failing(), MockSearchProvider::with_answer("x"));

    let response = app
        .oneshot(post_json("/classify", &serde_json::json!({"merchant": "Shell"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn test_classify_missing_field_is_422() {
    let ai = MockBackend::new();
    let search = MockSearchProvider::with_answer("x");
    let app = setup_test_app(ai.clone(), search.clone());

    let response = app
        .oneshot(post_json("/classify", &serde_json::json!({"name": "Shell"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("merchant"));
    assert_eq!(ai.call_count(), 0);
    assert_eq!(search.call_count(), 0);
}

#[tokio::test]
async fn test_classify_malformed_json_is_400() {
    let app = setup_test_app(MockBackend::new(), MockSearchProvider::with_answer("x"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/classify")
                .header("content-type", "application/json")
                .body(Body::from("{\"merchant\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Suggestion Tests ==========

#[tokio::test]
async fn test_suggest_fenced_array() {
    let beautified = "```json\n[\n  {\"title\": \"Brew at home\", \"description\": \"Save ₹300 a week.\"},\n  {\"title\": \"Go smaller\", \"description\": \"Order a tall.\"},\n  {\"title\": \"Use rewards\", \"description\": \"Redeem points.\"},\n  {\"title\": \"Bike fund\", \"description\": \"Move the savings.\"}\n]\n```\nHappy saving!";
    let ai = MockBackend::new().with_responses(["Brew coffee at home.", beautified]);
    let app = setup_test_app(ai, MockSearchProvider::with_answer("x"));

    let response = app
        .oneshot(post_json("/suggest-alternate", &suggestion_body(40_000)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0]["title"], "Brew at home");
    assert_eq!(items[3]["description"], "Move the savings.");
}

#[tokio::test]
async fn test_suggest_unparseable_returns_envelope_with_200() {
    let ai = MockBackend::new().with_responses(["advice", "Sorry, here is plain text."]);
    let app = setup_test_app(ai, MockSearchProvider::with_answer("x"));

    let response = app
        .oneshot(post_json("/suggest-alternate", &suggestion_body(40_000)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(
        json,
        serde_json::json!({
            "error": "Failed to parse beautified JSON",
            "raw": "Sorry, here is plain text."
        })
    );
}

#[tokio::test]
async fn test_suggest_empty_array_returns_envelope() {
    let ai = MockBackend::new().with_responses(["advice", "```json\n[]\n```"]);
    let app = setup_test_app(ai, MockSearchProvider::with_answer("x"));

    let response = app
        .oneshot(post_json("/suggest-alternate", &suggestion_body(40_000)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Failed to parse beautified JSON");
    assert_eq!(json["raw"], "```json\n[]\n```");
}

#[tokio::test]
async fn test_suggest_non_positive_income_is_422_without_calls() {
    for income in [0, -250] {
        let ai = MockBackend::new();
        let search = MockSearchProvider::with_answer("x");
        let app = setup_test_app(ai.clone(), search.clone());

        let response = app
            .oneshot(post_json("/suggest-alternate", &suggestion_body(income)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = get_body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("income"));
        assert_eq!(ai.call_count(), 0);
        assert_eq!(search.call_count(), 0);
    }
}

#[tokio::test]
async fn test_suggest_wrong_income_type_is_422() {
    let mut body = suggestion_body(1);
    body["income"] = serde_json::json!("a lot");
    let app = setup_test_app(MockBackend::new(), MockSearchProvider::with_answer("x"));

    let response = app.oneshot(post_json("/suggest-alternate", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ========== Health Tests ==========

#[tokio::test]
async fn test_health() {
    let app = setup_test_app(MockBackend::new(), MockSearchProvider::with_answer("x"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["ai_backend"], "mock");
    assert_eq!(json["ai_model"], "mock");
    assert_eq!(json["ai_available"], true);
    assert_eq!(json["search_provider"], "mock");
    assert_eq!(json["categories"], 3);
    assert_eq!(json["subcategories"], 3);
}

#[tokio::test]
async fn test_cors_allowed_origin() {
    let app = create_router_with_clients(
        taxonomy(),
        AIClient::mock(),
        SearchClient::Mock(MockSearchProvider::with_answer("x")),
        ServerConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
}

// ========== End-to-End over HTTP mocks ==========

#[tokio::test]
async fn test_classify_through_mock_servers() {
    let ollama = MockOllamaServer::start().await;
    let tavily = MockTavilyServer::start().await;

    let app = create_router_with_clients(
        taxonomy(),
        AIClient::ollama(&ollama.url(), "gemma3:1b"),
        SearchClient::Tavily(TavilyClient::with_base_url(
            Some("tvly-test".to_string()),
            &tavily.url(),
        )),
        ServerConfig::default(),
    );

    let response = app
        .oneshot(post_json(
            "/classify",
            &serde_json::json!({"merchant": "Starbucks"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["general_category"], "Food & Dining");
    assert_eq!(json["subcategory"], "Coffee Shop");
    assert_eq!(json["details"]["code"], 5814);
    assert_eq!(tavily.queries(), vec!["Starbucks".to_string()]);
    assert_eq!(ollama.prompts().len(), 2);
}

#[tokio::test]
async fn test_classify_with_rejected_search_key() {
    let ollama = MockOllamaServer::start().await;
    let tavily = MockTavilyServer::start().await;

    let app = create_router_with_clients(
        taxonomy(),
        AIClient::ollama(&ollama.url(), "gemma3:1b"),
        SearchClient::Tavily(TavilyClient::with_base_url(
            Some("invalid".to_string()),
            &tavily.url(),
        )),
        ServerConfig::default(),
    );

    let response = app
        .oneshot(post_json(
            "/classify",
            &serde_json::json!({"merchant": "Starbucks"}),
        ))
        .await
        .unwrap();

    // Fail-open: empty description, classification still runs
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["description"], "");
}
