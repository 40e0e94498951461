// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the summary gateway.
//!
//! All tunables carry baked-in defaults; `main` overlays environment
//! variables on top of them at startup.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the summary gateway service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Payload validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Upstream summarizer configuration
    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Sliding window duration in seconds (default: 600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Maximum requests per identity within one window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Maximum distinct identities tracked at once (default: 500).
    /// The least-recently-seen identity is evicted beyond this bound.
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
}

/// Validation configuration for submitted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum text length in characters (default: 50)
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// Maximum text length in characters (default: 30,000)
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

/// Upstream summarizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// API credential for the upstream service. Never serialized.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Model identifier (default: gemini-1.5-flash)
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL (default: Google generative language endpoint)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Instruction preamble prepended to every submitted text
    #[serde(default = "default_prompt_preamble")]
    pub prompt_preamble: String,

    /// Upstream request timeout in seconds (default: 30)
    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_window_secs() -> u64 {
    600
}

fn default_max_requests() -> u32 {
    5
}

fn default_max_clients() -> usize {
    500
}

fn default_min_text_chars() -> usize {
    50
}

fn default_max_text_chars() -> usize {
    30_000
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_prompt_preamble() -> String {
    "Summarize the following text in a concise paragraph:\n\n".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
            max_clients: default_max_clients(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_text_chars(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            api_base: default_api_base(),
            prompt_preamble: default_prompt_preamble(),
            timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

impl RateLimitConfig {
    /// Get the sliding window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl SummarizerConfig {
    /// Get the upstream request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the full prompt sent upstream: preamble followed by the
    /// submitted text.
    pub fn build_prompt(&self, text: &str) -> String {
        format!("{}{}", self.prompt_preamble, text)
    }
}
