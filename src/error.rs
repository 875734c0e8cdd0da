//! Error handling and custom error types
//!
//! Every failure of the tutoring core surfaces as a distinct [`Error`]
//! variant so callers can branch on the cause.

use crate::ai::gemini::types::{FinishReason, SafetyRating};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Network failure or a non-2xx answer from the model endpoint.
    #[error("Gemini API request failed{}: {message}", status_suffix(.status))]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    /// The model answered 2xx but produced no usable text.
    #[error("No content returned from Gemini. Finish Reason: {finish_reason}{}", block_suffix(.block_reason))]
    EmptyGeneration {
        finish_reason: FinishReason,
        safety_ratings: Vec<SafetyRating>,
        block_reason: Option<String>,
    },

    #[error("Malformed model response ({reason})")]
    MalformedResponse { raw: String, reason: String },

    #[error("Unexpected response shape: expected a JSON array of questions")]
    UnexpectedShape { raw: String },

    #[error("No valid questions could be parsed from the AI response ({dropped} dropped)")]
    NoValidQuestions { dropped: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

fn block_suffix(block_reason: &Option<String>) -> String {
    block_reason
        .as_ref()
        .map(|r| format!(", prompt blocked: {}", r))
        .unwrap_or_default()
}

impl Error {
    /// HTTP status carried by a [`Error::RequestFailed`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// True when an empty generation was caused by moderation rather than
    /// truncation or an unspecified stop.
    pub fn is_safety_block(&self) -> bool {
        match self {
            Error::EmptyGeneration {
                finish_reason,
                safety_ratings,
                block_reason,
            } => {
                block_reason.is_some()
                    || finish_reason.is_safety()
                    || safety_ratings.iter().any(|r| r.blocked == Some(true))
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
