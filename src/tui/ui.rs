use chrono::Datelike;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::title_bar::APP_TITLE;
use crate::tui::components::{MessageList, TitleBar};

const KEY_HINTS: &str = "Enter send · Ctrl+J newline · ↑↓ select · Tab reasoning · Ctrl+Y copy · Ctrl+C quit";

/// Title, messages, input, footer. Shared by drawing and hit testing so
/// both agree on where the message list is.
pub fn screen_layout(area: Rect, input_height: u16) -> [Rect; 4] {
    use Constraint::{Length, Min};
    Layout::vertical([Length(1), Min(0), Length(input_height), Length(1)]).areas(area)
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let input_height = tui.input_box.calculate_height(frame.area().width);
    let [title_area, main_area, input_area, footer_area] =
        screen_layout(frame.area(), input_height);

    MessageList::new(
        &mut tui.message_list,
        app.session.messages(),
        &app.ui,
        app.session.is_pending(),
        spinner_frame,
    )
    .render(frame, main_area);

    TitleBar::new(
        app.status_message.clone(),
        tui.message_list.has_unseen_content,
    )
    .render(frame, title_area);

    tui.input_box.pending = app.session.is_pending();
    tui.input_box.render(frame, input_area);

    draw_footer(frame, footer_area, chrono::Local::now().year());
}

pub fn copyright(year: i32) -> String {
    format!("© {year} {APP_TITLE}")
}

fn draw_footer(frame: &mut Frame, area: Rect, year: i32) {
    let copyright = copyright(year);
    let [hints_area, copyright_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(copyright.width() as u16),
    ])
    .areas(area);

    let dim = Style::default().fg(Color::DarkGray);
    frame.render_widget(Line::from(Span::styled(KEY_HINTS, dim)), hints_area);
    frame.render_widget(Line::from(Span::styled(copyright, dim)), copyright_area);
}

/// Which message (and which row inside it) is at screen row `screen_y`.
pub fn hit_test_message(
    screen_y: u16,
    frame_area: Rect,
    scroll_offset_y: u16,
    prefix_heights: &[u16],
    input_height: u16,
) -> Option<(usize, u16)> {
    let [_, main_area, _, _] = screen_layout(frame_area, input_height);

    if screen_y < main_area.y || screen_y >= main_area.y + main_area.height {
        return None;
    }

    // Convert screen Y to content Y (accounting for scroll)
    let content_y = (screen_y - main_area.y) + scroll_offset_y;

    let index = prefix_heights.partition_point(|&bottom| bottom <= content_y);
    let bottom = *prefix_heights.get(index)?;
    let top = if index == 0 { 0 } else { prefix_heights[index - 1] };
    debug_assert!(content_y < bottom);
    Some((index, content_y - top))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{reply, test_app};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_copyright_line() {
        assert_eq!(copyright(2026), "© 2026 Vietnam Travel Assistant");
    }

    #[test]
    fn test_draw_ui_fresh_conversation() {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        let app = test_app();
        let mut tui = TuiState::new();
        terminal.draw(|f| draw_ui(f, &app, &mut tui, 0)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains(APP_TITLE));
        assert!(text.contains("Xin chào"));
        assert!(text.contains("Type your Vietnam travel question..."));
        assert!(text.contains("Ctrl+Y copy"));
        assert!(text.contains("© "));
    }

    #[test]
    fn test_draw_ui_pending() {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        let mut app = test_app();
        app.session.begin_send("Hanoi in 3 days");
        let mut tui = TuiState::new();
        terminal.draw(|f| draw_ui(f, &app, &mut tui, 0)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Planning your trip…"));
        assert!(text.contains("Sending…"));
        assert!(tui.input_box.pending);
    }

    #[test]
    fn test_draw_ui_reply() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut app = test_app();
        app.session.begin_send("Hanoi in 3 days");
        app.session
            .complete_send(Ok(reply("abc", "Visit Old Quarter", vec![])));
        let mut tui = TuiState::new();
        terminal.draw(|f| draw_ui(f, &app, &mut tui, 0)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Visit Old Quarter"));
        assert!(!text.contains("Planning your trip…"));
    }

    #[test]
    fn test_hit_test_message() {
        let area = Rect::new(0, 0, 80, 24);
        // Title at row 0, messages from row 1
        let heights = [3, 8, 12];
        assert_eq!(hit_test_message(0, area, 0, &heights, 3), None);
        assert_eq!(hit_test_message(1, area, 0, &heights, 3), Some((0, 0)));
        assert_eq!(hit_test_message(3, area, 0, &heights, 3), Some((0, 2)));
        assert_eq!(hit_test_message(4, area, 0, &heights, 3), Some((1, 0)));
        // Scrolled down by 5: row 1 is content row 5
        assert_eq!(hit_test_message(1, area, 5, &heights, 3), Some((1, 2)));
        // Below all content
        assert_eq!(hit_test_message(15, area, 0, &heights, 3), None);
        // Input box rows
        assert_eq!(hit_test_message(21, area, 0, &heights, 3), None);
    }
}
