//! HTTP implementation of [`RequestDispatcher`] against the travel
//! assistant's chat endpoint.

use async_trait::async_trait;
use log::{debug, info, warn};

use super::dispatcher::{NetworkError, RequestDispatcher};
use super::types::{ChatRequest, ChatResponse};

/// Endpoint used when nothing is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api/v1/chat";

/// Posts turns as JSON to a fixed endpoint with `reqwest`.
///
/// No timeout or retry is layered on top of the client defaults.
pub struct HttpDispatcher {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpDispatcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RequestDispatcher for HttpDispatcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse, NetworkError> {
        info!(
            "Chat request: endpoint={}, conversation_id={:?}, history_len={}",
            self.endpoint,
            request.conversation_id,
            request.history.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Chat request failed to send: {}", e);
                NetworkError::transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Chat endpoint returned HTTP {}: {}", status.as_u16(), body);
            return Err(NetworkError::status(status.as_u16(), &body));
        }

        let bytes = response.bytes().await.map_err(|e| {
            warn!("Failed to read chat response body: {}", e);
            NetworkError::transport(e)
        })?;
        debug!("Chat response body: {} bytes", bytes.len());

        let reply: ChatResponse = serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Failed to decode chat response: {}", e);
            NetworkError::decode(e)
        })?;

        info!(
            "Chat response: conversation_id={}, answer_len={}, sources={}",
            reply.conversation_id,
            reply.answer.len(),
            reply.source_ids.len()
        );
        Ok(reply)
    }
}
