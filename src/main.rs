// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Summary Gateway Service
//!
//! A single-endpoint gateway that rate-limits and validates incoming text
//! before forwarding it to the upstream summarization model.
//!
//! ## Endpoints
//!
//! - `POST /summarize` with body `{"text": "..."}` — returns
//!   `{"summary": "..."}` or a classified error
//! - `GET /health`, `GET /healthz` — liveness probe
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `GEMINI_API_KEY`: upstream API credential (required)
//! - `BIND_ADDR`: server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_WINDOW_SECS`: sliding window duration (default: 600)
//! - `RATE_LIMIT_MAX_REQUESTS`: requests per identity per window (default: 5)
//! - `RATE_LIMIT_MAX_CLIENTS`: tracked identity bound (default: 500)
//! - `MIN_TEXT_CHARS` / `MAX_TEXT_CHARS`: payload length bounds
//!   (defaults: 50 / 30000)
//! - `SUMMARY_MODEL`: upstream model id (default: gemini-1.5-flash)
//! - `UPSTREAM_TIMEOUT_SECS`: upstream request timeout (default: 30)

use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use summary_gateway::{
    config::{Config, RateLimitConfig, SummarizerConfig, ValidationConfig},
    handlers::{router, AppState},
    limiter::RateLimiter,
    summarizer::GeminiSummarizer,
    validator::TextValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config()?;
    info!(
        bind_addr = %config.bind_addr,
        window_secs = config.rate_limit.window_secs,
        max_requests = config.rate_limit.max_requests,
        max_clients = config.rate_limit.max_clients,
        model = %config.summarizer.model,
        "Starting summary gateway"
    );

    // Create application state
    let limiter = RateLimiter::new(config.rate_limit.clone());
    let validator = TextValidator::new(config.validation.clone());
    let summarizer =
        GeminiSummarizer::new(config.summarizer.clone()).context("building upstream client")?;

    let state = Arc::new(AppState {
        limiter,
        validator,
        summarizer: Arc::new(summarizer),
        config: config.clone(),
    });

    // Spawn cleanup task so idle identities do not linger in the store
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup().await;
        }
    });

    // Build router and start server
    let app: Router = router(state);
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from environment variables.
fn load_config() -> anyhow::Result<Config> {
    let api_key = std::env::var("GEMINI_API_KEY")
        .context("GEMINI_API_KEY must be set to the upstream API credential")?;

    Ok(Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        rate_limit: RateLimitConfig {
            window_secs: std::env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            max_clients: std::env::var("RATE_LIMIT_MAX_CLIENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
        },
        validation: ValidationConfig {
            min_text_chars: std::env::var("MIN_TEXT_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
            max_text_chars: std::env::var("MAX_TEXT_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000),
        },
        summarizer: SummarizerConfig {
            api_key,
            model: std::env::var("SUMMARY_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            ..Default::default()
        },
    })
}
