//! # Chat Backend API
//!
//! Wire types and the dispatcher that exchanges one turn with the travel
//! assistant backend.

pub mod client;
pub mod dispatcher;
pub mod types;

pub use client::{DEFAULT_ENDPOINT, HttpDispatcher};
pub use dispatcher::{NetworkError, RequestDispatcher};
pub use types::{ChatRequest, ChatResponse, HistoryEntry};
