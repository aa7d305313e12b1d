//! # Actions
//!
//! Everything that can happen in Vivu becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend responds? That's `Action::ExchangeCompleted(result)`.
//!
//! The `update()` function takes the current state and an action,
//! mutates the state, and returns an `Effect` describing any I/O the
//! caller should perform. No side effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use std::time::Instant;

use log::{debug, info, warn};

use crate::api::{ChatRequest, ChatResponse, NetworkError};
use crate::core::state::{App, WELCOME_STATUS};

#[derive(Debug, Clone)]
pub enum Action {
    /// User submitted the input box.
    Submit(String),
    /// The background exchange finished.
    ExchangeCompleted(Result<ChatResponse, NetworkError>),
    ToggleReasoning(usize),
    /// User asked to copy the message at this position.
    Copy(usize),
    /// The clipboard write for `position` finished at `at`.
    CopyCompleted {
        position: usize,
        succeeded: bool,
        at: Instant,
    },
    /// Clock tick; clears an expired copy indicator.
    Tick(Instant),
    Quit,
}

/// I/O the event loop performs after `update()` returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    SpawnExchange(ChatRequest),
    WriteClipboard { position: usize, text: String },
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            if app.session.is_pending() {
                debug!("Submit ignored: a send is already pending");
                return Effect::None;
            }
            match app.session.begin_send(&text) {
                Some(request) => {
                    app.status_message = String::from("Sending…");
                    Effect::SpawnExchange(request)
                }
                None => Effect::None,
            }
        }
        Action::ExchangeCompleted(outcome) => {
            if !app.session.is_pending() {
                warn!("Exchange completed with no send pending, dropping it");
                return Effect::None;
            }
            app.status_message = match &outcome {
                Ok(_) => String::from(WELCOME_STATUS),
                Err(e) => format!("Request failed: {}", e.message()),
            };
            app.session.complete_send(outcome);
            Effect::None
        }
        Action::ToggleReasoning(position) => {
            match app.session.message(position) {
                Some(message) if message.parsed().visible_reasoning().is_some() => {
                    app.ui.toggle_reasoning(position);
                }
                _ => debug!("No reasoning to toggle at position {}", position),
            }
            Effect::None
        }
        Action::Copy(position) => match app.ui.copy_text(position, &app.session) {
            Some(text) => Effect::WriteClipboard { position, text },
            None => {
                debug!("Copy ignored: no message at position {}", position);
                Effect::None
            }
        },
        Action::CopyCompleted {
            position,
            succeeded,
            at,
        } => {
            app.ui.record_copy(position, succeeded, at);
            app.status_message = if succeeded {
                String::from("Copied to clipboard")
            } else {
                String::from("Copy failed")
            };
            Effect::None
        }
        Action::Tick(now) => {
            if app.ui.expire(now) && !app.session.is_pending() {
                app.status_message = String::from(WELCOME_STATUS);
            }
            Effect::None
        }
        Action::Quit => {
            info!("Quit requested");
            Effect::Quit
        }
    }
}
