//! Markdown → ratatui `Text` renderer.
//!
//! Walks `pulldown_cmark` events and builds styled `Line`/`Span` values for
//! the subset travel answers actually use: headings, emphasis, strong,
//! strikethrough, inline code, fenced code, lists, block quotes, rules and
//! links. Raw HTML, tables and images are dropped.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

const RULE_WIDTH: usize = 32;

/// Parse markdown into owned styled `Text`, with `base_fg` as the default
/// foreground.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut builder = TextBuilder::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        builder.handle(event);
    }
    builder.finish()
}

struct TextBuilder {
    lines: Vec<Line<'static>>,
    base_fg: Color,
    /// Inline style stack; each entry is already patched onto its parent.
    styles: Vec<Style>,
    /// Gutter spans repeated at the start of every line (quotes, code).
    gutters: Vec<Span<'static>>,
    /// None = bullet list, Some(n) = ordered list at n.
    lists: Vec<Option<u64>>,
    in_code: bool,
    link: Option<String>,
    /// A block just ended; the next block gets a blank line before it.
    pending_gap: bool,
}

impl TextBuilder {
    fn new(base_fg: Color) -> Self {
        Self {
            lines: Vec::new(),
            base_fg,
            styles: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            in_code: false,
            link: None,
            pending_gap: false,
        }
    }

    fn finish(self) -> Text<'static> {
        Text::from(self.lines)
    }

    fn current(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.current().patch(overlay));
    }

    fn new_line(&mut self) {
        self.lines.push(Line::from(self.gutters.clone()));
    }

    fn append(&mut self, span: Span<'static>) {
        if self.lines.is_empty() {
            self.new_line();
        }
        if let Some(line) = self.lines.last_mut() {
            line.push_span(span);
        }
    }

    fn start_block(&mut self) {
        if self.pending_gap && !self.lines.is_empty() {
            self.lines.push(Line::from(self.gutters.clone()));
        }
        self.pending_gap = false;
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.append(Span::styled(
                c.to_string(),
                Style::default().fg(Color::Yellow).bg(Color::Black),
            )),
            Event::SoftBreak => self.append(Span::raw(" ")),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.start_block();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(RULE_WIDTH),
                    Style::default().fg(Color::DarkGray),
                )));
                self.pending_gap = true;
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // Paragraphs inside list items continue the bullet line
                if self.lists.is_empty() || self.pending_gap {
                    self.start_block();
                    self.new_line();
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                self.new_line();
                self.push_style(heading_style(level));
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.gutters
                    .push(Span::styled("▎ ", Style::default().fg(Color::DarkGray)));
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(_) => {
                self.start_block();
                self.gutters
                    .push(Span::styled("┃ ", Style::default().fg(Color::DarkGray)));
                self.in_code = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.pending_gap = false;
                self.new_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.append(Span::styled(marker, Style::default().fg(Color::DarkGray)));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.push_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.pending_gap = true,
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.pending_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.styles.pop();
                self.pending_gap = true;
            }
            TagEnd::CodeBlock => {
                self.gutters.pop();
                self.in_code = false;
                self.pending_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.pending_gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                // Show the target only when it differs from the link text
                if let Some(url) = self.link.take()
                    && !self.last_line_ends_with(&url)
                {
                    self.append(Span::styled(
                        format!(" <{url}>"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            _ => {}
        }
    }

    fn last_line_ends_with(&self, s: &str) -> bool {
        self.lines
            .last()
            .and_then(|l| l.spans.last())
            .is_some_and(|span| span.content.ends_with(s))
    }

    fn text(&mut self, cow: CowStr<'_>) {
        // ratatui renders \t as zero-width
        let text = cow.replace('\t', "    ");

        if self.in_code {
            let style = Style::default().fg(Color::White);
            for line in text.lines() {
                self.new_line();
                self.append(Span::styled(line.to_owned(), style));
            }
            return;
        }

        let style = self.current();
        self.append(Span::styled(text, style));
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => Style::default().add_modifier(Modifier::BOLD),
        _ => Style::default().add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}
