// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Upstream summarization adapter.
//!
//! Wraps the Gemini `generateContent` call behind the [`Summarizer`] trait
//! and classifies its failures: a response with zero candidates means the
//! safety filter blocked the content (a caller problem), everything else is
//! an upstream failure. One attempt per request, no retries.

use crate::config::SummarizerConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Summarization failure classification.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// The upstream safety filter rejected the content
    #[error("content blocked by upstream safety filters")]
    ContentBlocked,

    /// Transport-level failure (connect, timeout, body read)
    #[error("upstream transport error: {0}")]
    Transport(reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),

    /// Upstream answered 200 but the body was not in the expected shape
    #[error("unexpected upstream response shape: {0}")]
    MalformedResponse(&'static str),
}

/// A single external capability: turn prompt text into a summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String, SummarizeError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini-backed summarizer.
pub struct GeminiSummarizer {
    http: reqwest::Client,
    config: SummarizerConfig,
}

impl GeminiSummarizer {
    /// Create a summarizer with an explicit request timeout taken from the
    /// configuration.
    pub fn new(config: SummarizerConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { http, config })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        )
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, SummarizeError> {
        let payload = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        // The endpoint URL carries the API key; strip it from transport
        // errors so the key never reaches the logs.
        let response = self
            .http
            .post(self.endpoint_url())
            .json(&payload)
            .send()
            .await
            .map_err(|err| SummarizeError::Transport(err.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummarizeError::Status(status));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| SummarizeError::Transport(err.without_url()))?;

        debug!(
            model = %self.config.model,
            candidates = body.candidates.len(),
            "upstream summarization response received"
        );
        extract_summary(body)
    }
}

/// Pull the summary text out of a decoded response.
///
/// Zero candidates is the safety-block signal; a candidate without text is
/// a malformed response.
fn extract_summary(response: GenerateContentResponse) -> Result<String, SummarizeError> {
    let candidate = match response.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => return Err(SummarizeError::ContentBlocked),
    };

    let part = candidate
        .content
        .and_then(|content| content.parts.into_iter().next())
        .ok_or(SummarizeError::MalformedResponse(
            "candidate missing content parts",
        ))?;

    let summary = part.text.trim();
    if summary.is_empty() {
        return Err(SummarizeError::MalformedResponse("empty summary text"));
    }
    Ok(summary.to_string())
}
