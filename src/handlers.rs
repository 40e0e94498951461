// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the summary gateway.
//!
//! The summarize handler runs a strictly ordered admission pipeline: rate
//! limit, payload presence/type, minimum length, maximum length, then the
//! upstream call. The first failing gate determines the response and later
//! gates never run, so throttled callers cost no parsing work and rejected
//! methods never touch the counter store.

use crate::config::Config;
use crate::error::ApiError;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::summarizer::{SummarizeError, Summarizer};
use crate::validator::TextValidator;
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Identity used when no forwarded address is present. All such callers
/// share one rate-limit bucket; permissive by intent, not a security
/// boundary.
pub const FALLBACK_IDENTITY: &str = "127.0.0.1";

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub validator: TextValidator,
    pub summarizer: Arc<dyn Summarizer>,
    pub config: Config,
}

/// Successful summarization response.
#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/summarize", post(summarize).fallback(method_not_allowed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "summary-gateway",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Responder for non-POST requests to the summarize endpoint.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Derive the rate-limit identity from the forwarded-address header.
///
/// Takes the first hop of `X-Forwarded-For`; the value is used as an opaque
/// map key and never validated as an address.
pub fn client_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| FALLBACK_IDENTITY.to_string())
}

/// Summarize the submitted text.
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let identity = client_identity(&headers);

    // The identity is counted before the threshold comparison, so the first
    // request past the limit is itself counted.
    match state.limiter.check(&identity).await {
        RateLimitResult::Limited { retry_after } => {
            info!(
                identity = %identity,
                retry_after_secs = retry_after.as_secs(),
                "request rate limited"
            );
            return Err(ApiError::RateLimited { retry_after });
        }
        RateLimitResult::Allowed { count, remaining } => {
            debug!(identity = %identity, count, remaining, "request admitted");
        }
    }

    // Payload is only parsed once the caller has passed the rate limit
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let text = state.validator.validate(&payload).map_err(|err| {
        info!(identity = %identity, error = %err, "payload rejected");
        ApiError::from(err)
    })?;

    let prompt = state.config.summarizer.build_prompt(&text);
    match state.summarizer.summarize(&prompt).await {
        Ok(summary) => {
            debug!(
                identity = %identity,
                summary_chars = summary.chars().count(),
                "summary generated"
            );
            Ok(Json(SummarizeResponse { summary }))
        }
        Err(SummarizeError::ContentBlocked) => {
            info!(identity = %identity, "content blocked by upstream safety filters");
            Err(ApiError::ContentBlocked)
        }
        Err(err) => {
            // Full detail stays server-side; the caller gets the generic
            // failure message.
            error!(identity = %identity, error = %err, "summarization failed");
            Err(ApiError::SummaryFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_identity_from_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));

        assert_eq!(client_identity(&headers), "1.2.3.4");
    }

    #[test]
    fn test_identity_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1, 172.16.0.1"),
        );

        assert_eq!(client_identity(&headers), "203.0.113.7");
    }

    #[test]
    fn test_identity_falls_back_to_loopback() {
        let headers = HeaderMap::new();
        assert_eq!(client_identity(&headers), FALLBACK_IDENTITY);

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  "));
        assert_eq!(client_identity(&headers), FALLBACK_IDENTITY);
    }

    #[test]
    fn test_identity_is_not_validated_as_an_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));

        assert_eq!(client_identity(&headers), "not-an-ip");
    }
}
