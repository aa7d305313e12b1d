//! # Conversation Session
//!
//! Owns the message list and the backend's conversation identifier, and
//! drives one turn at a time:
//!
//! ```text
//!   Idle ──begin_send──▶ Sending ──complete_send(Ok | Err)──▶ Idle
//! ```
//!
//! The user turn is appended before the request goes out. Every send ends
//! with exactly one assistant message, either the reply or
//! [`FALLBACK_REPLY`]. Messages are only ever appended.

use log::{debug, info, warn};

use crate::api::{ChatRequest, ChatResponse, HistoryEntry, NetworkError, RequestDispatcher};
use crate::core::message::Message;

/// Shown in place of a reply when the exchange fails.
pub const FALLBACK_REPLY: &str = "⚠️ Sorry, I encountered an error. Please try again.";

/// Opening line of a fresh conversation.
pub const DEFAULT_GREETING: &str = "Xin chào 🇻🇳! I'm your Vietnam Travel Assistant. \
    Tell me what kind of trip you're dreaming about — romantic, adventure, or cultural?";

#[derive(Debug, Default)]
pub struct ConversationSession {
    /// Assigned by the first successful reply, then never replaced.
    id: Option<String>,
    messages: Vec<Message>,
    pending: bool,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that opens with an assistant greeting at position 0.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
            ..Self::default()
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, position: usize) -> Option<&Message> {
        self.messages.get(position)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Appends the user turn and returns the request to dispatch.
    ///
    /// Returns `None` (and changes nothing) for blank input. The history in
    /// the request is the conversation as it was before this turn.
    pub fn begin_send(&mut self, text: &str) -> Option<ChatRequest> {
        if text.trim().is_empty() {
            debug!("Ignoring blank send");
            return None;
        }

        let request = ChatRequest {
            query: text.to_string(),
            conversation_id: self.id.clone(),
            history: self.messages.iter().map(HistoryEntry::from).collect(),
        };

        self.messages.push(Message::user(text));
        self.pending = true;
        info!(
            "Turn started: {} prior messages, conversation_id={:?}",
            request.history.len(),
            request.conversation_id
        );
        Some(request)
    }

    /// Resolves the outstanding turn with exactly one assistant message.
    pub fn complete_send(&mut self, outcome: Result<ChatResponse, NetworkError>) {
        match outcome {
            Ok(reply) => {
                if self.id.is_none() {
                    info!("Conversation id assigned: {}", reply.conversation_id);
                    self.id = Some(reply.conversation_id);
                } else if self.id.as_deref() != Some(reply.conversation_id.as_str()) {
                    debug!(
                        "Keeping conversation id {:?} (reply carried {})",
                        self.id, reply.conversation_id
                    );
                }
                self.messages
                    .push(Message::assistant(reply.answer).with_sources(reply.source_ids));
            }
            Err(e) => {
                warn!("Turn failed: {}", e);
                self.messages.push(Message::assistant(FALLBACK_REPLY));
            }
        }
        self.pending = false;
    }

    /// Runs a whole turn against `dispatcher`. Returns `false` if the input
    /// was blank and nothing happened.
    pub async fn send(&mut self, dispatcher: &dyn RequestDispatcher, text: &str) -> bool {
        let Some(request) = self.begin_send(text) else {
            return false;
        };
        debug!("Dispatching turn via {}", dispatcher.name());
        let outcome = dispatcher.exchange(&request).await;
        self.complete_send(outcome);
        true
    }
}
