// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client-facing error taxonomy and its HTTP mapping.
//!
//! Every pipeline outcome maps to exactly one status code and a minimal
//! JSON body. Upstream failure detail stays in the server logs; the caller
//! only ever sees the generic message.

use crate::validator::ValidationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Client-facing request outcome errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Too many requests. Please try again in {}.", retry_hint(.retry_after))]
    RateLimited { retry_after: Duration },

    #[error("Invalid text. Min {min_chars} characters required.")]
    InvalidText { min_chars: usize },

    #[error("Text too large. Max {} characters.", group_digits(.max_chars))]
    TextTooLarge { max_chars: usize },

    #[error("Content was blocked by safety filters.")]
    ContentBlocked,

    #[error("Failed to generate summary.")]
    SummaryFailed,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidText { .. } | Self::ContentBlocked => StatusCode::BAD_REQUEST,
            Self::TextTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::SummaryFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        match self {
            Self::RateLimited { retry_after } => (
                status,
                [("Retry-After", retry_after.as_secs().to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::NotText { min } | ValidationError::TooShort { min, .. } => {
                Self::InvalidText { min_chars: min }
            }
            ValidationError::TooLong { max, .. } => Self::TextTooLarge { max_chars: max },
        }
    }
}

/// Render a duration as a human-readable retry hint.
fn retry_hint(window: &Duration) -> String {
    let secs = window.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        if minutes == 1 {
            "1 minute".to_string()
        } else {
            format!("{minutes} minutes")
        }
    } else if secs == 1 {
        "1 second".to_string()
    } else {
        format!("{secs} seconds")
    }
}

/// Format a count with thousands separators.
fn group_digits(n: &usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
