//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::{ChatRequest, ChatResponse, NetworkError, RequestDispatcher};
use crate::core::clipboard::{ClipboardBackend, ClipboardError};
use crate::core::message::SourceId;
use crate::core::state::App;

/// Creates a test App with the default greeting and a failing dispatcher.
pub fn test_app() -> App {
    App::new(
        Arc::new(ScriptedDispatcher::failing()),
        Some(crate::core::session::DEFAULT_GREETING.to_string()),
    )
}

/// Builds a backend reply with numeric source ids.
pub fn reply(conversation_id: &str, answer: &str, source_ids: Vec<i64>) -> ChatResponse {
    ChatResponse {
        conversation_id: conversation_id.to_string(),
        answer: answer.to_string(),
        source_ids: source_ids.into_iter().map(SourceId::Number).collect(),
    }
}

/// A dispatcher that returns the same canned outcome every time and
/// records the requests it saw.
pub struct ScriptedDispatcher {
    outcome: Result<ChatResponse, NetworkError>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedDispatcher {
    pub fn replying(response: ChatResponse) -> Self {
        Self {
            outcome: Ok(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: Err(NetworkError::transport("connection refused")),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestDispatcher for ScriptedDispatcher {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse, NetworkError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}

/// Clipboard backend that keeps every write in memory. Clones share storage.
#[derive(Clone, Default)]
pub struct MemoryClipboard {
    writes: Arc<Mutex<Vec<String>>>,
}

impl MemoryClipboard {
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Clipboard backend that always fails.
pub struct BrokenClipboard;

impl ClipboardBackend for BrokenClipboard {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn set_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Native("no clipboard owner".to_string()))
    }
}

/// `Write` sink whose clones share one buffer.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().unwrap()).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
