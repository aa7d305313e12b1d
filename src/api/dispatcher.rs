use std::fmt;

use async_trait::async_trait;

use super::types::{ChatRequest, ChatResponse};

/// A failed turn exchange.
///
/// Transport failures, non-success statuses and undecodable bodies all end
/// up here. The message is for the log; callers treat every instance the
/// same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkError {
    message: String,
}

impl NetworkError {
    pub fn transport(detail: impl fmt::Display) -> Self {
        Self {
            message: format!("request failed: {detail}"),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            message: format!("HTTP {status}: {body}"),
        }
    }

    pub fn decode(detail: impl fmt::Display) -> Self {
        Self {
            message: format!("malformed response: {detail}"),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "network error: {}", self.message)
    }
}

impl std::error::Error for NetworkError {}

/// Sends one user turn to the chat backend and returns its reply.
///
/// Exactly one attempt per call. Implementations must not retry.
#[async_trait]
pub trait RequestDispatcher: Send + Sync {
    /// Returns the name of the dispatcher, for logging.
    fn name(&self) -> &str;

    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse, NetworkError>;
}
