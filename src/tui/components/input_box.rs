//! # InputBox Component
//!
//! Multi-line text field for the next question.
//!
//! ## Responsibilities
//!
//! - Capture text input, paste and Ctrl+J newlines
//! - Cursor movement within the buffer
//! - Emit `Submit` on Enter, unless a send is already pending
//! - Show a placeholder when empty and a "Sending…" title while pending
//!
//! Text is hard-wrapped by display width rather than by word, so the
//! cursor position can be derived directly from the same row layout that
//! is rendered.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub const PLACEHOLDER: &str = "Type your Vietnam travel question...";

/// Borders (2) + horizontal padding (2)
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders
const VERTICAL_OVERHEAD: u16 = 2;
/// Rows shown before the field scrolls internally
const MAX_VISIBLE_LINES: u16 = 5;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    /// Text buffer (Internal State)
    pub buffer: String,
    /// Whether a send is in flight (Prop)
    pub pending: bool,
    /// Cursor as a byte offset into `buffer`
    cursor: usize,
    /// First visible row when the text is taller than the field
    scroll_offset: u16,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            pending: false,
            cursor: 0,
            scroll_offset: 0,
        }
    }

    /// Height for the current buffer at `area_width`, between 3 and
    /// `MAX_VISIBLE_LINES + 2`.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let rows = wrap_rows(&self.buffer, inner_width(area_width)).len() as u16;
        rows.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    fn insert(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// Row index and display column of the cursor.
    fn cursor_cell(&self, width: u16) -> (u16, u16) {
        let rows = wrap_rows(&self.buffer, width);
        let row = rows
            .iter()
            .rposition(|&(start, _)| start <= self.cursor)
            .unwrap_or(0);
        let (start, _) = rows[row];
        let col = display_width(&self.buffer[start..self.cursor]);
        (row as u16, col)
    }

    fn keep_cursor_visible(&mut self, width: u16) {
        let (row, _) = self.cursor_cell(width);
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = row + 1 - MAX_VISIBLE_LINES;
        }
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = inner_width(area.width);
        self.keep_cursor_visible(width);

        let title = if self.pending { "Sending…" } else { "Ask" };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title)
            .padding(Padding::horizontal(1));

        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(PLACEHOLDER).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            let lines: Vec<Line> = wrap_rows(&self.buffer, width)
                .into_iter()
                .skip(self.scroll_offset as usize)
                .take(MAX_VISIBLE_LINES as usize)
                .map(|(start, end)| Line::raw(&self.buffer[start..end]))
                .collect();
            Paragraph::new(lines).style(Style::default().fg(Color::White))
        };

        frame.render_widget(paragraph.block(block), area);

        let (row, col) = self.cursor_cell(width);
        // Border (1) + padding (1)
        let x = area.x + 2 + col.min(width.saturating_sub(1));
        let y = area.y + 1 + row.saturating_sub(self.scroll_offset);
        frame.set_cursor_position((x, y));
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut utf8 = [0u8; 4];
                self.insert(c.encode_utf8(&mut utf8));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.insert(&text.replace("\r\n", "\n").replace('\r', "\n"));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                let prev = self.buffer[..self.cursor].char_indices().next_back()?.0;
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete => {
                let len = self.buffer[self.cursor..].chars().next()?.len_utf8();
                self.buffer.drain(self.cursor..self.cursor + len);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => {
                self.cursor = self.buffer[..self.cursor].char_indices().next_back()?.0;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorRight => {
                self.cursor += self.buffer[self.cursor..].chars().next()?.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                (self.cursor != line_start).then(|| {
                    self.cursor = line_start;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor..]
                    .find('\n')
                    .map(|i| self.cursor + i)
                    .unwrap_or(self.buffer.len());
                (self.cursor != line_end).then(|| {
                    self.cursor = line_end;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::Submit => {
                if self.pending || self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                self.scroll_offset = 0;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}

fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

fn display_width(s: &str) -> u16 {
    s.chars().map(|c| c.width().unwrap_or(0) as u16).sum()
}

/// Byte ranges of the visual rows of `text` at `width` columns. Newlines end
/// a row and are excluded from it. A trailing full row is followed by an
/// empty one so a cursor at the very end has somewhere to sit.
fn wrap_rows(text: &str, width: u16) -> Vec<(usize, usize)> {
    if width == 0 {
        return vec![(0, text.len())];
    }

    let mut rows = Vec::new();
    let mut start = 0;
    let mut used: u16 = 0;
    for (i, ch) in text.char_indices() {
        if ch == '\n' {
            rows.push((start, i));
            start = i + 1;
            used = 0;
            continue;
        }
        let w = ch.width().unwrap_or(0) as u16;
        if used > 0 && used + w > width {
            rows.push((start, i));
            start = i;
            used = 0;
        }
        used += w;
    }
    rows.push((start, text.len()));
    if used >= width {
        rows.push((text.len(), text.len()));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
        input
    }

    fn screen(input: &mut InputBox, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| input.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = typed("ab");
        assert_eq!(input.buffer, "ab");
        assert_eq!(
            input.handle_event(&TuiEvent::Backspace),
            Some(InputEvent::ContentChanged)
        );
        assert_eq!(input.buffer, "a");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = typed("Huế");
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::Delete);
        assert_eq!(input.buffer, "Hu");
        input.handle_event(&TuiEvent::InputChar('ế'));
        assert_eq!(input.buffer, "Huế");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut input = InputBox::new();
        assert_eq!(input.handle_event(&TuiEvent::Backspace), None);
        assert_eq!(input.handle_event(&TuiEvent::CursorLeft), None);
    }

    #[test]
    fn test_home_end_stay_on_logical_line() {
        let mut input = typed("one\ntwo");
        input.handle_event(&TuiEvent::CursorHome);
        input.handle_event(&TuiEvent::InputChar('>'));
        assert_eq!(input.buffer, "one\n>two");
        input.handle_event(&TuiEvent::CursorEnd);
        input.handle_event(&TuiEvent::InputChar('!'));
        assert_eq!(input.buffer, "one\n>two!");
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("a\r\nb".into()));
        assert_eq!(input.buffer, "a\nb");
    }

    #[test]
    fn test_submit_takes_buffer() {
        let mut input = typed("Ha Long Bay cruise?");
        assert_eq!(
            input.handle_event(&TuiEvent::Submit),
            Some(InputEvent::Submit("Ha Long Bay cruise?".into()))
        );
        assert!(input.buffer.is_empty());
    }

    #[test]
    fn test_submit_blank_is_ignored() {
        let mut input = typed("   ");
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.buffer, "   ");
    }

    #[test]
    fn test_submit_while_pending_keeps_text() {
        let mut input = typed("next question");
        input.pending = true;
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.buffer, "next question");
    }

    #[test]
    fn test_wrap_rows() {
        assert_eq!(wrap_rows("", 10), vec![(0, 0)]);
        assert_eq!(wrap_rows("abc\nde", 10), vec![(0, 3), (4, 6)]);
        assert_eq!(wrap_rows("abcdef", 4), vec![(0, 4), (4, 6)]);
        // Full last row gets an empty row after it
        assert_eq!(wrap_rows("abcd", 4), vec![(0, 4), (4, 4)]);
        // Wide characters count as two columns
        assert_eq!(wrap_rows("越南越", 4), vec![(0, 6), (6, 9)]);
    }

    #[test]
    fn test_height_is_clamped() {
        let mut input = InputBox::new();
        assert_eq!(input.calculate_height(40), 1 + VERTICAL_OVERHEAD);
        input.buffer = "a\nb\nc\nd\ne\nf\ng".into();
        assert_eq!(input.calculate_height(40), MAX_VISIBLE_LINES + VERTICAL_OVERHEAD);
    }

    #[test]
    fn test_render_shows_placeholder_when_empty() {
        let mut input = InputBox::new();
        let text = screen(&mut input, 50, 3);
        assert!(text.contains(PLACEHOLDER));
        assert!(text.contains("Ask"));
    }

    #[test]
    fn test_render_title_while_pending() {
        let mut input = typed("Sapa");
        input.pending = true;
        let text = screen(&mut input, 40, 3);
        assert!(text.contains("Sending…"));
        assert!(text.contains("Sapa"));
    }
}
