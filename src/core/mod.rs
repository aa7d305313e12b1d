//! # Core Application Logic
//!
//! This module contains Vivu's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Session (turns)      │
//!                    │  • Parser (reasoning)   │
//!                    │  • State + update()     │
//!                    └───────────┬─────────────┘
//!                                │
//!                   ┌────────────┴────────────┐
//!                   ▼                         ▼
//!            ┌────────────┐            ┌────────────┐
//!            │    TUI     │            │    API     │
//!            │  Adapter   │            │  (reqwest) │
//!            └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`message`]: `Message`, `Role` and `SourceId`
//! - [`parser`]: splits raw assistant content into answer and reasoning
//! - [`session`]: `ConversationSession`, the send state machine
//! - [`ui_state`]: reasoning panels and the copy indicator
//! - [`clipboard`]: native and OSC 52 clipboard backends
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`config`]: layered configuration

pub mod action;
pub mod clipboard;
pub mod config;
pub mod message;
pub mod parser;
pub mod session;
pub mod state;
pub mod ui_state;
