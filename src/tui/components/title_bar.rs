//! # TitleBar Component
//!
//! One-line header: the assistant's name, the status message, and a
//! "↓ New" marker when there is content below the scroll position.
//!
//! Stateless. The parent builds it each frame from `App` and TUI state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(app.status_message.clone(), has_unseen);
//! title_bar.render(frame, title_area);
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub const APP_TITLE: &str = "Vietnam Travel Assistant";

pub struct TitleBar {
    pub status_message: String,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(status_message: String, has_unseen_content: bool) -> Self {
        Self {
            status_message,
            has_unseen_content,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            APP_TITLE,
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::raw(self.status_message.clone()));
        }
        if self.has_unseen_content {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("↓ New", Style::default().fg(Color::Yellow)));
        }

        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(title_bar: &mut TitleBar) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_with_status() {
        let text = rendered(&mut TitleBar::new("Sending…".to_string(), false));
        assert!(text.contains(APP_TITLE));
        assert!(text.contains("Sending…"));
        assert!(!text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_with_unseen_content() {
        let text = rendered(&mut TitleBar::new("Ready".to_string(), true));
        assert!(text.contains("Ready"));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_without_status_has_no_separator() {
        let text = rendered(&mut TitleBar::new(String::new(), false));
        assert!(text.contains(APP_TITLE));
        assert!(!text.contains('|'));
    }
}
