use serde::{Deserialize, Serialize};

use crate::core::message::{Message, Role, SourceId};

/// One prior turn as sent to the backend. Content goes out verbatim,
/// reasoning markup included.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for HistoryEntry {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Body of `POST /api/v1/chat`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub query: String,
    /// Serialized as `null` until the backend has assigned one.
    pub conversation_id: Option<String>,
    pub history: Vec<HistoryEntry>,
}

/// Successful response body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub conversation_id: String,
    pub answer: String,
    #[serde(default)]
    pub source_ids: Vec<SourceId>,
}
