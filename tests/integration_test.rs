// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the summary gateway.
//!
//! Drives the full router with a test summarizer so no network access is
//! required.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use summary_gateway::{
    config::Config,
    handlers::{router, AppState},
    limiter::RateLimiter,
    summarizer::{SummarizeError, Summarizer},
    validator::TextValidator,
};
use tower::ServiceExt;

/// Summarizer double that records prompts and returns a fixed summary.
#[derive(Default)]
struct RecordingSummarizer {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl Summarizer for RecordingSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, SummarizeError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("A concise summary.".to_string())
    }
}

/// Summarizer double simulating an upstream safety block.
struct BlockedSummarizer;

#[async_trait]
impl Summarizer for BlockedSummarizer {
    async fn summarize(&self, _prompt: &str) -> Result<String, SummarizeError> {
        Err(SummarizeError::ContentBlocked)
    }
}

/// Summarizer double simulating an upstream outage.
struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(&self, _prompt: &str) -> Result<String, SummarizeError> {
        Err(SummarizeError::MalformedResponse("candidate missing content parts"))
    }
}

fn test_app(config: Config, summarizer: Arc<dyn Summarizer>) -> Router {
    let state = Arc::new(AppState {
        limiter: RateLimiter::new(config.rate_limit.clone()),
        validator: TextValidator::new(config.validation.clone()),
        summarizer,
        config,
    });
    router(state)
}

async fn post_summarize(app: &Router, forwarded_for: Option<&str>, body: Body) -> (StatusCode, Value) {
    let mut request = Request::post("/summarize").header("content-type", "application/json");
    if let Some(ip) = forwarded_for {
        request = request.header("x-forwarded-for", ip);
    }

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, payload)
}

fn text_body(length: usize) -> Body {
    Body::from(json!({ "text": "a".repeat(length) }).to_string())
}

#[tokio::test]
async fn test_valid_text_returns_summary() {
    let summarizer = Arc::new(RecordingSummarizer::default());
    let app = test_app(Config::default(), summarizer.clone());

    let (status, payload) = post_summarize(&app, Some("9.9.9.9"), text_body(200)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        payload.get("summary").and_then(Value::as_str),
        Some("A concise summary.")
    );

    // The upstream prompt is the configured preamble followed by the
    // submitted text
    let prompts = summarizer.prompts.lock().unwrap();
    let config = Config::default();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with(&config.summarizer.prompt_preamble));
    assert!(prompts[0].ends_with(&"a".repeat(200)));
}

#[tokio::test]
async fn test_minimum_length_text_reaches_upstream() {
    let app = test_app(Config::default(), Arc::new(RecordingSummarizer::default()));

    let (status, _) = post_summarize(&app, None, text_body(50)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_short_text_rejected() {
    let app = test_app(Config::default(), Arc::new(RecordingSummarizer::default()));

    let (status, payload) = post_summarize(&app, None, text_body(49)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("Invalid text. Min 50 characters required.")
    );
}

#[tokio::test]
async fn test_missing_text_rejected() {
    let app = test_app(Config::default(), Arc::new(RecordingSummarizer::default()));

    let (status, payload) =
        post_summarize(&app, None, Body::from(json!({}).to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("Invalid text. Min 50 characters required.")
    );
}

#[tokio::test]
async fn test_non_string_text_rejected() {
    let app = test_app(Config::default(), Arc::new(RecordingSummarizer::default()));

    let (status, _) =
        post_summarize(&app, None, Body::from(json!({ "text": 12345 }).to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_body_rejected() {
    let app = test_app(Config::default(), Arc::new(RecordingSummarizer::default()));

    let (status, payload) = post_summarize(&app, None, Body::from("this is not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("Invalid text. Min 50 characters required.")
    );
}

#[tokio::test]
async fn test_oversized_text_rejected() {
    let app = test_app(Config::default(), Arc::new(RecordingSummarizer::default()));

    let (status, payload) = post_summarize(&app, None, text_body(30_001)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("Text too large. Max 30,000 characters.")
    );
}

#[tokio::test]
async fn test_sixth_request_in_window_is_throttled() {
    let app = test_app(Config::default(), Arc::new(RecordingSummarizer::default()));

    for i in 0..5 {
        let (status, _) = post_summarize(&app, Some("1.2.3.4"), text_body(100)).await;
        assert_eq!(status, StatusCode::OK, "request {} should be admitted", i + 1);
    }

    let (status, payload) = post_summarize(&app, Some("1.2.3.4"), text_body(100)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("Too many requests. Please try again in 10 minutes.")
    );
}

#[tokio::test]
async fn test_throttled_response_carries_retry_after_header() {
    let mut config = Config::default();
    config.rate_limit.max_requests = 1;
    let app = test_app(config, Arc::new(RecordingSummarizer::default()));

    post_summarize(&app, Some("1.2.3.4"), text_body(100)).await;

    let response = app
        .clone()
        .oneshot(
            Request::post("/summarize")
                .header("content-type", "application/json")
                .header("x-forwarded-for", "1.2.3.4")
                .body(text_body(100))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok()),
        Some("600")
    );
}

#[tokio::test]
async fn test_non_post_method_rejected() {
    let app = test_app(Config::default(), Arc::new(RecordingSummarizer::default()));

    let response = app
        .clone()
        .oneshot(Request::get("/summarize").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("Method Not Allowed")
    );
}

#[tokio::test]
async fn test_rejected_method_does_not_consume_quota() {
    let mut config = Config::default();
    config.rate_limit.max_requests = 2;
    let app = test_app(config, Arc::new(RecordingSummarizer::default()));

    // Non-POST requests are rejected before the rate-limit gate
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(
                Request::get("/summarize")
                    .header("x-forwarded-for", "1.2.3.4")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    // The full quota is still available
    for _ in 0..2 {
        let (status, _) = post_summarize(&app, Some("1.2.3.4"), text_body(100)).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = post_summarize(&app, Some("1.2.3.4"), text_body(100)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_invalid_payloads_still_consume_quota() {
    let mut config = Config::default();
    config.rate_limit.max_requests = 2;
    let app = test_app(config, Arc::new(RecordingSummarizer::default()));

    // The rate-limit gate runs before payload validation, so malformed
    // bodies count against the caller's quota
    for _ in 0..2 {
        let (status, _) = post_summarize(&app, Some("1.2.3.4"), text_body(1)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = post_summarize(&app, Some("1.2.3.4"), text_body(100)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_identities_rate_limited_independently() {
    let mut config = Config::default();
    config.rate_limit.max_requests = 1;
    let app = test_app(config, Arc::new(RecordingSummarizer::default()));

    let (status, _) = post_summarize(&app, Some("1.1.1.1"), text_body(100)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_summarize(&app, Some("2.2.2.2"), text_body(100)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_summarize(&app, Some("1.1.1.1"), text_body(100)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_callers_without_forwarded_address_share_one_bucket() {
    let mut config = Config::default();
    config.rate_limit.max_requests = 1;
    let app = test_app(config, Arc::new(RecordingSummarizer::default()));

    let (status, _) = post_summarize(&app, None, text_body(100)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_summarize(&app, None, text_body(100)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_blocked_content_maps_to_client_error() {
    let app = test_app(Config::default(), Arc::new(BlockedSummarizer));

    let (status, payload) = post_summarize(&app, None, text_body(100)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("Content was blocked by safety filters.")
    );
}

#[tokio::test]
async fn test_upstream_failure_maps_to_generic_server_error() {
    let app = test_app(Config::default(), Arc::new(FailingSummarizer));

    let (status, payload) = post_summarize(&app, None, text_body(100)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // No upstream detail leaks into the client-visible body
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("Failed to generate summary.")
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(Config::default(), Arc::new(RecordingSummarizer::default()));

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        payload.get("status").and_then(Value::as_str),
        Some("healthy")
    );
}
