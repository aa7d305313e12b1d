use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::message::{Message as ChatMessage, Role};
use crate::core::ui_state::UiState;
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
pub const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Space between items on a control row.
const CONTROL_GAP: &str = "  ";

/// One row of controls: each span with the control it triggers.
type ControlRow = Vec<(Option<Control>, Span<'static>)>;

/// Clickable buttons on an assistant bubble's control line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    ToggleReasoning,
    Copy,
}

/// What the copy button says for this bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyLabel {
    Idle,
    Copied,
    Failed,
}

impl CopyLabel {
    pub fn for_position(ui: &UiState, position: usize) -> Self {
        if ui.is_copied(position) {
            CopyLabel::Copied
        } else if ui.copy_failed_at(position) {
            CopyLabel::Failed
        } else {
            CopyLabel::Idle
        }
    }

    fn text(self) -> &'static str {
        match self {
            CopyLabel::Idle => "[Copy]",
            CopyLabel::Copied => "[Copied ✓]",
            CopyLabel::Failed => "[Copy failed]",
        }
    }
}

/// A single chat bubble.
///
/// Transient: built each frame from a message and the bits of UI state
/// that affect it. Heights are measured from the same `Text` that is
/// rendered, so layout and drawing cannot disagree.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a ChatMessage,
    pub is_selected: bool,
    /// Reasoning panel open
    pub is_expanded: bool,
    pub copy_label: CopyLabel,
}

impl<'a> Message<'a> {
    pub fn new(
        message: &'a ChatMessage,
        is_selected: bool,
        is_expanded: bool,
        copy_label: CopyLabel,
    ) -> Self {
        Self {
            message,
            is_selected,
            is_expanded,
            copy_label,
        }
    }

    fn base_color(&self) -> Color {
        match self.message.role {
            Role::User => Color::Green,
            Role::Assistant => Color::Blue,
        }
    }

    /// Buttons and tags shown under an assistant answer, each with the
    /// control it triggers (if any). Empty for user messages.
    fn control_items(&self) -> Vec<(Option<Control>, Span<'static>)> {
        if self.message.role != Role::Assistant {
            return Vec::new();
        }
        let has_reasoning = self.message.parsed().visible_reasoning().is_some();
        let button = Style::default().fg(Color::Cyan);
        let mut items = Vec::new();
        if has_reasoning {
            let label = if self.is_expanded {
                "[Hide reasoning]"
            } else {
                "[Show reasoning]"
            };
            items.push((Some(Control::ToggleReasoning), Span::styled(label, button)));
        }
        let copy_style = match self.copy_label {
            CopyLabel::Idle => button,
            CopyLabel::Copied => Style::default().fg(Color::Green),
            CopyLabel::Failed => Style::default().fg(Color::Red),
        };
        items.push((
            Some(Control::Copy),
            Span::styled(self.copy_label.text(), copy_style),
        ));
        if has_reasoning {
            items.push((
                None,
                Span::styled(
                    "chain-of-thought",
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::ITALIC),
                ),
            ));
        }
        items
    }

    /// Control items packed into rows of at most `content_width` columns.
    ///
    /// Items never split across rows, so every row is drawn unwrapped and a
    /// click maps to exactly one item. An item wider than the bubble gets a
    /// row of its own and is clipped.
    fn control_rows(&self, content_width: u16) -> Vec<ControlRow> {
        let mut rows: Vec<ControlRow> = Vec::new();
        let mut row_width: u16 = 0;
        for (control, span) in self.control_items() {
            let w = span.content.width() as u16;
            let gap = CONTROL_GAP.len() as u16;
            match rows.last_mut() {
                Some(row) if row_width + gap + w <= content_width => {
                    row.push((None, Span::raw(CONTROL_GAP)));
                    row.push((control, span));
                    row_width += gap + w;
                }
                _ => {
                    rows.push(vec![(control, span)]);
                    row_width = w;
                }
            }
        }
        rows
    }

    /// Everything inside the border above the control rows. Word-wrapped
    /// when drawn.
    fn content(&self) -> Text<'static> {
        let base = self.base_color();
        let parsed = self.message.parsed();
        if self.message.role == Role::User {
            return Text::styled(parsed.main, Style::default().fg(base));
        }

        let reasoning = parsed.visible_reasoning();
        let mut text = markdown::render(&parsed.main, base);

        if let Some(sources) = self.message.sources.as_ref().filter(|s| !s.is_empty()) {
            let ids: Vec<String> = sources.iter().map(|id| id.to_string()).collect();
            text.lines.push(Line::from(Span::styled(
                format!("sources: {}", ids.join(", ")),
                Style::default().fg(Color::DarkGray),
            )));
        }

        if self.is_expanded
            && let Some(reasoning) = reasoning
        {
            let dim = Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC);
            text.lines.push(Line::default());
            text.lines.push(Line::from(Span::styled(
                "Reasoning",
                dim.add_modifier(Modifier::BOLD),
            )));
            for line in reasoning.lines() {
                text.lines.push(Line::from(Span::styled(format!("│ {line}"), dim)));
            }
        }

        // Gap above the controls
        text.lines.push(Line::default());
        text
    }

    fn control_lines(rows: Vec<ControlRow>) -> Vec<Line<'static>> {
        rows.into_iter()
            .map(|row| Line::from(row.into_iter().map(|(_, span)| span).collect::<Vec<_>>()))
            .collect()
    }

    /// Content inside the border at `content_width`, control rows included.
    pub fn body(&self, content_width: u16) -> Text<'static> {
        let mut text = self.content();
        text.lines
            .extend(Self::control_lines(self.control_rows(content_width)));
        text
    }

    /// Height of the bubble at `width`, borders included.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Too narrow for borders + padding; still occupy a row
            return 1;
        }
        let content_lines = Paragraph::new(self.content())
            .wrap(Wrap { trim: false })
            .line_count(content_width) as u16;
        let control_rows = self.control_rows(content_width).len() as u16;
        (content_lines + control_rows).max(1) + VERTICAL_OVERHEAD
    }

    /// Control under a click in a bubble `width` columns wide. `row` counts
    /// from the top border; `column` from the first content column inside
    /// the border and padding.
    pub fn control_at(&self, row: u16, column: u16, width: u16) -> Option<Control> {
        let rows = self.control_rows(width.saturating_sub(HORIZONTAL_OVERHEAD));
        // Control rows sit directly above the bottom border
        let first = self
            .calculate_height(width)
            .checked_sub(1 + rows.len() as u16)?;
        let items = rows.get(row.checked_sub(first)? as usize)?;

        let mut x: u16 = 0;
        for (control, span) in items {
            let w = span.content.width() as u16;
            if column < x + w {
                return *control;
            }
            x += w;
        }
        None
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let base = Style::default().fg(self.base_color());
        let border_style = if self.is_selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            base.add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title(self.message.role.label())
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        let rows = self.control_rows(inner_area.width);
        let [content_area, controls_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(rows.len() as u16)])
                .areas(inner_area);

        Paragraph::new(self.content())
            .wrap(Wrap { trim: false })
            .render(content_area, buf);
        Paragraph::new(Self::control_lines(rows)).render(controls_area, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

/// Stand-in bubble shown at the end of the list while a reply is pending.
pub struct PendingBubble {
    pub spinner_frame: usize,
}

impl PendingBubble {
    pub const HEIGHT: u16 = 1 + VERTICAL_OVERHEAD;
    pub const TEXT: &'static str = "Planning your trip…";
}

impl Widget for PendingBubble {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::Blue);
        let block = Block::bordered()
            .title(Role::Assistant.label())
            .border_type(BorderType::Rounded)
            .border_style(style.add_modifier(Modifier::DIM))
            .title_style(style.add_modifier(Modifier::DIM))
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let spinner = SPINNER[self.spinner_frame % SPINNER.len()];
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{spinner} "), Style::default().fg(Color::Yellow)),
            Span::styled(Self::TEXT, style.add_modifier(Modifier::ITALIC)),
        ]))
        .block(block)
        .render(area, buf);
    }
}
