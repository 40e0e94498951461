// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Summary Gateway
//!
//! A single-endpoint ingress gateway that accepts raw text, enforces abuse
//! controls, and forwards the text to an upstream summarization model:
//!
//! - Per-IP rate limiting (5 requests per 10 minutes default) over a
//!   bounded, expiring counter store with LRU eviction
//! - Sliding-window semantics: every request from an identity renews its
//!   full window
//! - Payload validation (min 50 / max 30,000 characters)
//! - Gemini-backed summarization with failure classification: upstream
//!   safety blocks surface as client errors, everything else as a generic
//!   server failure

pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod summarizer;
pub mod validator;

pub use config::Config;
pub use error::ApiError;
pub use handlers::{router, AppState};
pub use limiter::{CounterStore, RateLimitResult, RateLimiter};
pub use summarizer::{GeminiSummarizer, SummarizeError, Summarizer};
pub use validator::{TextValidator, ValidationError};
