// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Payload validation for summarization requests.
//!
//! The request body must carry a `text` field holding a string within the
//! configured length bounds. Lengths are counted in characters, not bytes.

use crate::config::ValidationConfig;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("`text` field is missing or not a string")]
    NotText { min: usize },

    #[error("text is {actual} characters, minimum is {min}")]
    TooShort { actual: usize, min: usize },

    #[error("text is {actual} characters, maximum is {max}")]
    TooLong { actual: usize, max: usize },
}

/// Summarization request validator.
pub struct TextValidator {
    config: ValidationConfig,
}

impl TextValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate the request payload and extract the submitted text.
    ///
    /// Checks run in order: presence/type, minimum length, maximum length.
    /// The first failing check determines the error.
    pub fn validate(&self, payload: &Value) -> Result<String, ValidationError> {
        let text = match payload.get("text").and_then(Value::as_str) {
            Some(text) => text,
            None => {
                debug!("payload missing a string `text` field");
                return Err(ValidationError::NotText {
                    min: self.config.min_text_chars,
                });
            }
        };

        let length = text.chars().count();

        if length < self.config.min_text_chars {
            debug!(length, min = self.config.min_text_chars, "text too short");
            return Err(ValidationError::TooShort {
                actual: length,
                min: self.config.min_text_chars,
            });
        }

        if length > self.config.max_text_chars {
            debug!(length, max = self.config.max_text_chars, "text too long");
            return Err(ValidationError::TooLong {
                actual: length,
                max: self.config.max_text_chars,
            });
        }

        Ok(text.to_string())
    }
}
