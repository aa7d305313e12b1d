//! # Per-message UI State
//!
//! Which reasoning panels are open, and which message was copied last.
//!
//! Both are keyed by position in the session's message list. That is sound
//! only because messages are never removed or reordered.
//!
//! The copy indicator is a single slot with a deadline. Each copy action
//! overwrites both, so an older deadline can never clear a newer indicator:
//!
//! ```text
//! copy(2) @ t0 ─▶ Copied(2), until t0+1.8s
//! copy(4) @ t1 ─▶ Copied(4), until t1+1.8s   (t0's reset no longer applies)
//! expire(t1+1.8s) ─▶ None
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;

use crate::core::clipboard::ClipboardService;
use crate::core::session::ConversationSession;

/// How long the copied / failed indicator stays up.
pub const COPY_RESET_DELAY: Duration = Duration::from_millis(1800);

/// Outcome of the most recent copy action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyIndicator {
    Copied(usize),
    /// The clipboard write failed. Not tied to any message.
    Failed,
}

/// The indicator slot: what happened, which message was copied, and when
/// the indicator goes away.
#[derive(Debug, Clone, Copy)]
struct CopySlot {
    indicator: CopyIndicator,
    position: usize,
    deadline: Instant,
}

#[derive(Debug, Default)]
pub struct UiState {
    expanded: HashMap<usize, bool>,
    copied: Option<CopySlot>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_reasoning(&mut self, position: usize) {
        let open = self.expanded.entry(position).or_insert(false);
        *open = !*open;
        debug!("Reasoning panel {} {}", position, if *open { "opened" } else { "closed" });
    }

    pub fn is_expanded(&self, position: usize) -> bool {
        self.expanded.get(&position).copied().unwrap_or(false)
    }

    /// The live copy indicator, if any.
    pub fn copied(&self) -> Option<CopyIndicator> {
        self.copied.map(|slot| slot.indicator)
    }

    pub fn is_copied(&self, position: usize) -> bool {
        self.copied() == Some(CopyIndicator::Copied(position))
    }

    pub fn copy_failed(&self) -> bool {
        self.copied() == Some(CopyIndicator::Failed)
    }

    /// Whether the failed copy was an attempt to copy `position`. The
    /// public indicator stays a sentinel; only the attempted bubble shows
    /// the failure.
    pub fn copy_failed_at(&self, position: usize) -> bool {
        matches!(
            self.copied,
            Some(CopySlot {
                indicator: CopyIndicator::Failed,
                position: p,
                ..
            }) if p == position
        )
    }

    /// Text a copy of `position` would put on the clipboard: the visible
    /// answer, plus the reasoning when its panel is open.
    pub fn copy_text(&self, position: usize, session: &ConversationSession) -> Option<String> {
        let parsed = session.message(position)?.parsed();
        let mut text = parsed.main.clone();
        if self.is_expanded(position)
            && let Some(reasoning) = parsed.visible_reasoning()
        {
            text.push_str("\n\nReasoning:\n");
            text.push_str(reasoning);
        }
        Some(text)
    }

    /// Records the result of a clipboard write made at `now`.
    pub fn record_copy(&mut self, position: usize, succeeded: bool, now: Instant) {
        let indicator = if succeeded {
            CopyIndicator::Copied(position)
        } else {
            CopyIndicator::Failed
        };
        self.copied = Some(CopySlot {
            indicator,
            position,
            deadline: now + COPY_RESET_DELAY,
        });
    }

    /// Copies message `position` to the clipboard and updates the indicator.
    /// Returns whether the write succeeded; a position with no message is a
    /// no-op.
    ///
    /// Synchronous form of `copy_text` + `record_copy`. The event loop runs
    /// those two separately so the write happens outside `update()`.
    pub fn copy(
        &mut self,
        position: usize,
        session: &ConversationSession,
        clipboard: &mut ClipboardService,
        now: Instant,
    ) -> bool {
        let Some(text) = self.copy_text(position, session) else {
            debug!("Copy ignored: no message at position {}", position);
            return false;
        };
        let succeeded = clipboard.write(&text);
        self.record_copy(position, succeeded, now);
        succeeded
    }

    /// Clears the indicator once its deadline has passed. Returns true if it
    /// was cleared by this call.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.copied {
            Some(CopySlot { deadline, .. }) if now >= deadline => {
                self.copied = None;
                true
            }
            _ => false,
        }
    }

    /// Whether an indicator is waiting to be cleared.
    pub fn has_live_indicator(&self) -> bool {
        self.copied.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BrokenClipboard, MemoryClipboard, reply};

    fn session_with_reply(answer: &str) -> ConversationSession {
        let mut session = ConversationSession::new();
        session.begin_send("Hanoi in 3 days");
        session.complete_send(Ok(reply("abc", answer, vec![])));
        session
    }

    fn memory_service(memory: &MemoryClipboard) -> ClipboardService {
        let handle = memory.clone();
        ClipboardService::new(
            Box::new(move || {
                Some(Box::new(handle.clone()) as Box<dyn crate::core::clipboard::ClipboardBackend>)
            }),
            Box::new(BrokenClipboard),
        )
    }

    #[test]
    fn test_expanded_defaults_to_false() {
        let ui = UiState::new();
        assert!(!ui.is_expanded(0));
        assert!(!ui.is_expanded(7));
    }

    #[test]
    fn test_toggle_is_per_position() {
        let mut ui = UiState::new();
        ui.toggle_reasoning(1);
        assert!(ui.is_expanded(1));
        assert!(!ui.is_expanded(2));
        ui.toggle_reasoning(1);
        assert!(!ui.is_expanded(1));
    }

    #[test]
    fn test_toggle_does_not_touch_copied() {
        let mut ui = UiState::new();
        let now = Instant::now();
        ui.record_copy(1, true, now);
        ui.toggle_reasoning(1);
        assert_eq!(ui.copied(), Some(CopyIndicator::Copied(1)));
    }

    #[test]
    fn test_copy_text_collapsed_is_main_only() {
        let session = session_with_reply("<reasoning>Consider weather</reasoning>Visit Old Quarter");
        let ui = UiState::new();
        assert_eq!(ui.copy_text(1, &session).as_deref(), Some("Visit Old Quarter"));
    }

    #[test]
    fn test_copy_text_expanded_appends_reasoning() {
        let session = session_with_reply("<reasoning>Consider weather</reasoning>Visit Old Quarter");
        let mut ui = UiState::new();
        ui.toggle_reasoning(1);
        assert_eq!(
            ui.copy_text(1, &session).as_deref(),
            Some("Visit Old Quarter\n\nReasoning:\nConsider weather")
        );
    }

    #[test]
    fn test_copy_text_expanded_without_reasoning_is_main_only() {
        let session = session_with_reply("Visit Old Quarter");
        let mut ui = UiState::new();
        ui.toggle_reasoning(1);
        assert_eq!(ui.copy_text(1, &session).as_deref(), Some("Visit Old Quarter"));
    }

    #[test]
    fn test_copy_text_out_of_range() {
        let session = ConversationSession::new();
        assert_eq!(UiState::new().copy_text(3, &session), None);
    }

    #[test]
    fn test_copy_success_sets_indicator_then_expires() {
        let session = session_with_reply("Visit Old Quarter");
        let memory = MemoryClipboard::default();
        let mut clipboard = memory_service(&memory);
        let mut ui = UiState::new();
        let t0 = Instant::now();

        assert!(ui.copy(1, &session, &mut clipboard, t0));
        assert_eq!(memory.writes(), vec!["Visit Old Quarter"]);
        assert!(ui.is_copied(1));

        assert!(!ui.expire(t0 + Duration::from_millis(1799)));
        assert!(ui.is_copied(1));

        assert!(ui.expire(t0 + COPY_RESET_DELAY));
        assert_eq!(ui.copied(), None);
    }

    #[test]
    fn test_copy_failure_sets_sentinel() {
        let session = session_with_reply("Visit Old Quarter");
        let mut clipboard = ClipboardService::new(Box::new(|| None), Box::new(BrokenClipboard));
        let mut ui = UiState::new();
        let t0 = Instant::now();

        assert!(!ui.copy(1, &session, &mut clipboard, t0));
        assert!(ui.copy_failed());
        assert!(!ui.is_copied(1));
        assert!(ui.copy_failed_at(1));
        assert!(!ui.copy_failed_at(0));

        ui.expire(t0 + COPY_RESET_DELAY);
        assert_eq!(ui.copied(), None);
    }

    #[test]
    fn test_newer_copy_restarts_delay() {
        let mut ui = UiState::new();
        let t0 = Instant::now();
        ui.record_copy(1, true, t0);
        let t1 = t0 + Duration::from_millis(1000);
        ui.record_copy(3, true, t1);

        // First copy's deadline passes but the newer indicator stays
        assert!(!ui.expire(t0 + COPY_RESET_DELAY));
        assert_eq!(ui.copied(), Some(CopyIndicator::Copied(3)));

        assert!(ui.expire(t1 + COPY_RESET_DELAY));
        assert_eq!(ui.copied(), None);
    }

    #[test]
    fn test_success_after_failure_clears_failure() {
        let mut ui = UiState::new();
        let t0 = Instant::now();
        ui.record_copy(1, false, t0);
        ui.record_copy(3, true, t0);
        assert!(!ui.copy_failed_at(1));
        assert!(ui.is_copied(3));
    }

    #[test]
    fn test_copy_out_of_range_is_noop() {
        let session = ConversationSession::new();
        let memory = MemoryClipboard::default();
        let mut clipboard = memory_service(&memory);
        let mut ui = UiState::new();

        assert!(!ui.copy(5, &session, &mut clipboard, Instant::now()));
        assert!(memory.writes().is_empty());
        assert_eq!(ui.copied(), None);
    }
}
