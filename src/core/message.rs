use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::parser::{self, ParsedContent};

/// Who authored a message. Serialized the way the chat backend expects.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Assistant => "guide",
        }
    }
}

/// A source reference attached to an assistant reply.
///
/// The backend sends plain JSON scalars. Integers and strings are accepted;
/// any other shape fails decoding of the whole response.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(untagged)]
pub enum SourceId {
    Number(i64),
    Text(String),
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Number(n) => write!(f, "{n}"),
            SourceId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One entry of the conversation. Never edited once appended.
///
/// Not a wire type: turns go out as `HistoryEntry`, which leaves sources
/// behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    /// Raw text as typed or as returned by the backend, markup included.
    pub content: String,
    pub sources: Option<Vec<SourceId>>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources: None,
        }
    }

    pub fn with_sources(mut self, sources: Vec<SourceId>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Splits the raw content into visible text and reasoning.
    /// Recomputed on every call; nothing is cached on the message.
    pub fn parsed(&self) -> ParsedContent {
        parser::parse(&self.content)
    }
}
