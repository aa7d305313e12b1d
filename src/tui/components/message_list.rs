//! # MessageList Component
//!
//! Scrollable view of the conversation.
//!
//! ## Responsibilities
//!
//! - Display every message as a bubble, plus a pending placeholder
//! - Scrolling, with auto-scroll while pinned to the bottom
//! - Keyboard selection of assistant messages
//! - Layout caching (bubble heights) for rendering and hit testing
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the session's messages
//! and UI state (props).

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::message::{Message as ChatMessage, Role};
use crate::core::ui_state::UiState;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{CopyLabel, Message, PendingBubble};
use crate::tui::event::TuiEvent;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Assistant message picked with ↑/↓ or a click
    pub selected_index: Option<usize>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Content exists below the viewport
    pub has_unseen_content: bool,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            selected_index: None,
            viewport_height: 0,
            has_unseen_content: false,
        }
    }

    fn max_scroll(&self) -> u16 {
        let total: u16 = self.layout.heights.iter().sum();
        total.saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scroll the viewport so the selected message is fully visible.
    /// If the message is taller than the viewport, align its top edge.
    pub fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_index else {
            return;
        };
        let Some((item_top, item_bottom)) = self.layout.span_of(idx) else {
            return;
        };
        let offset_y = self.scroll_state.offset().y;

        if item_top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: item_top });
            self.stick_to_bottom = false;
        } else if item_bottom > offset_y + self.viewport_height {
            let new_y = item_bottom
                .saturating_sub(self.viewport_height)
                .min(item_top);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            self.stick_to_bottom = new_y >= self.max_scroll();
        }
    }

    /// Re-engage auto-scroll once the user scrolls back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Select the assistant message before the current selection, or the
    /// latest one if nothing is selected.
    pub fn select_prev(&mut self, messages: &[ChatMessage]) {
        let before = self.selected_index.unwrap_or(messages.len());
        if let Some(idx) = messages[..before.min(messages.len())]
            .iter()
            .rposition(|m| m.role == Role::Assistant)
        {
            self.selected_index = Some(idx);
            self.scroll_to_selected();
        }
    }

    /// Select the next assistant message after the current selection.
    pub fn select_next(&mut self, messages: &[ChatMessage]) {
        let Some(current) = self.selected_index else {
            return;
        };
        if let Some(offset) = messages
            .iter()
            .skip(current + 1)
            .position(|m| m.role == Role::Assistant)
        {
            self.selected_index = Some(current + 1 + offset);
            self.scroll_to_selected();
        }
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [ChatMessage],
    pub ui: &'a UiState,
    pub pending: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [ChatMessage],
        ui: &'a UiState,
        pending: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            ui,
            pending,
            spinner_frame,
        }
    }

    fn bubble(&self, position: usize) -> Message<'a> {
        let messages: &'a [ChatMessage] = self.messages;
        Message::new(
            &messages[position],
            self.state.selected_index == Some(position),
            self.ui.is_expanded(position),
            CopyLabel::for_position(self.ui, position),
        )
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area

        // 1. Update layout cache. Height only depends on width and the
        // props below; message text never changes once appended.
        let props: Vec<BubbleProps> = (0..self.messages.len())
            .map(|i| {
                (
                    self.ui.is_expanded(i),
                    CopyLabel::for_position(self.ui, i),
                )
            })
            .collect();
        let reusable = self.state.layout.reusable_count(content_width, &props);
        self.state.layout.heights.truncate(reusable);
        for i in reusable..self.messages.len() {
            let height = self.bubble(i).calculate_height(content_width);
            self.state.layout.heights.push(height);
        }
        self.state.layout.rebuild_prefix_heights();
        self.state.layout.update_metadata(content_width, props);

        let total_height: u16 = self.state.layout.heights.iter().sum();
        let canvas_height = if self.pending {
            total_height + PendingBubble::HEIGHT
        } else {
            total_height
        };

        // 2. Clamp scroll offset to prevent overscrolling past content.
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible bubbles into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible_range {
            let (top, bottom) = self.state.layout.span_of(i).unwrap_or_default();
            let rect = Rect::new(0, top, content_width, bottom - top);
            scroll_view.render_widget(self.bubble(i), rect);
        }

        if self.pending {
            let rect = Rect::new(0, total_height, content_width, PendingBubble::HEIGHT);
            scroll_view.render_widget(
                PendingBubble {
                    spinner_frame: self.spinner_frame,
                },
                rect,
            );
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        let current_offset = self.state.scroll_state.offset().y;
        self.state.has_unseen_content =
            canvas_height > area.height && current_offset < canvas_height - area.height;
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Height-affecting props of one bubble: reasoning open, copy label.
type BubbleProps = (bool, CopyLabel);

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    /// Running totals: `prefix_heights[i]` is the bottom edge of item `i`.
    pub prefix_heights: Vec<u16>,
    content_width: u16,
    props: Vec<BubbleProps>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            content_width: 0,
            props: Vec::new(),
        }
    }

    /// Number of leading heights still valid for `props` at `content_width`.
    fn reusable_count(&self, content_width: u16, props: &[BubbleProps]) -> usize {
        if self.content_width != content_width {
            return 0;
        }
        let limit = self.heights.len().min(props.len());
        self.props
            .iter()
            .zip(props)
            .take(limit)
            .position(|(cached, current)| cached != current)
            .unwrap_or(limit)
    }

    /// Width the cached heights were measured at; bubbles are drawn this wide.
    pub fn content_width(&self) -> u16 {
        self.content_width
    }

    fn update_metadata(&mut self, content_width: u16, props: Vec<BubbleProps>) {
        self.content_width = content_width;
        self.props = props;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc += h;
                Some(*acc)
            })
            .collect();
    }

    /// Top (inclusive) and bottom (exclusive) content rows of item `idx`.
    pub fn span_of(&self, idx: usize) -> Option<(u16, u16)> {
        let bottom = *self.prefix_heights.get(idx)?;
        let top = if idx == 0 {
            0
        } else {
            self.prefix_heights[idx - 1]
        };
        Some((top, bottom))
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
