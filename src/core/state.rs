//! # Application State
//!
//! Core business state for Vivu. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── dispatcher: Arc<dyn RequestDispatcher>  // backend transport
//! ├── session: ConversationSession            // messages, id, pending flag
//! ├── ui: UiState                             // reasoning panels, copy indicator
//! ├── status_message: String                  // status bar text
//! └── endpoint: String                        // shown in the title bar
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::api::RequestDispatcher;
use crate::core::config::ResolvedConfig;
use crate::core::session::ConversationSession;
use crate::core::ui_state::UiState;

pub const WELCOME_STATUS: &str = "Ready";

pub struct App {
    pub dispatcher: Arc<dyn RequestDispatcher>,
    pub session: ConversationSession,
    pub ui: UiState,
    pub status_message: String,
    pub endpoint: String,
}

impl App {
    pub fn new(dispatcher: Arc<dyn RequestDispatcher>, greeting: Option<String>) -> Self {
        let session = match greeting {
            Some(text) => ConversationSession::with_greeting(text),
            None => ConversationSession::new(),
        };
        Self {
            endpoint: dispatcher.name().to_string(),
            dispatcher,
            session,
            ui: UiState::new(),
            status_message: String::from(WELCOME_STATUS),
        }
    }

    pub fn from_config(dispatcher: Arc<dyn RequestDispatcher>, config: &ResolvedConfig) -> Self {
        let mut app = Self::new(dispatcher, config.greeting.clone());
        app.endpoint = config.endpoint.clone();
        app
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_pending()
    }

    /// Position of the most recent assistant message, if any.
    pub fn last_assistant(&self) -> Option<usize> {
        self.session
            .messages()
            .iter()
            .rposition(|m| m.role == crate::core::message::Role::Assistant)
    }
}
