//! # Message Parser
//!
//! Splits a raw assistant message into the answer the user sees and the
//! optional reasoning block the model embedded in it.
//!
//! ```text
//! "<reasoning>Consider weather</reasoning><itinerary>Visit Old Quarter</itinerary>"
//!        │                                          │
//!        ▼                                          ▼
//!   reasoning: "Consider weather"           main: "Visit Old Quarter"
//! ```
//!
//! Only well-formed `<reasoning>…</reasoning>` spans are recognized. A lone
//! opening tag is left in the visible text as-is.

use std::sync::LazyLock;

use regex::Regex;

static REASONING_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<reasoning>(.*?)</reasoning>").expect("reasoning pattern is valid")
});

static ITINERARY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?itinerary>").expect("itinerary pattern is valid"));

/// Visible answer plus optional reasoning, derived from a message's raw content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedContent {
    pub main: String,
    pub reasoning: Option<String>,
}

impl ParsedContent {
    /// Reasoning worth showing: present and not blank.
    pub fn visible_reasoning(&self) -> Option<&str> {
        self.reasoning.as_deref().filter(|r| !r.is_empty())
    }
}

/// Parse raw message text. Pure and idempotent: parsing `main` again yields
/// the same `main` and no reasoning.
pub fn parse(text: &str) -> ParsedContent {
    if text.is_empty() {
        return ParsedContent::default();
    }

    let reasoning = REASONING_SPAN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|inner| inner.as_str().trim().to_string());

    ParsedContent {
        main: clean(text).trim().to_string(),
        reasoning,
    }
}

/// Removes reasoning spans and itinerary tags until neither is left.
///
/// Stripping one kind of markup can splice together text that forms the
/// other (`<reason<itinerary>ing>`), so a single pass is not enough.
fn clean(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let without_spans = REASONING_SPAN.replace_all(&current, "");
        let next = ITINERARY_TAG.replace_all(&without_spans, "").into_owned();
        // Every change shortens the text, so this terminates.
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_idempotent(text: &str) {
        let first = parse(text);
        let second = parse(&first.main);
        assert_eq!(second.main, first.main, "main changed on reparse of {text:?}");
        assert_eq!(second.reasoning, None, "reasoning survived reparse of {text:?}");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            parse(""),
            ParsedContent {
                main: String::new(),
                reasoning: None
            }
        );
    }

    #[test]
    fn test_plain_text_is_trimmed() {
        let parsed = parse("  Hello Hanoi!\n");
        assert_eq!(parsed.main, "Hello Hanoi!");
        assert_eq!(parsed.reasoning, None);
    }

    #[test]
    fn test_extracts_reasoning_span() {
        let parsed = parse("<reasoning>Consider weather</reasoning>Visit Old Quarter");
        assert_eq!(parsed.main, "Visit Old Quarter");
        assert_eq!(parsed.reasoning.as_deref(), Some("Consider weather"));
    }

    #[test]
    fn test_reasoning_inner_text_is_trimmed() {
        let parsed = parse("Answer <reasoning>\n  rainy season in Hue \n</reasoning>");
        assert_eq!(parsed.main, "Answer");
        assert_eq!(parsed.reasoning.as_deref(), Some("rainy season in Hue"));
    }

    #[test]
    fn test_reasoning_tags_are_case_insensitive() {
        let parsed = parse("<REASONING>Budget first</Reasoning>Take the sleeper bus");
        assert_eq!(parsed.main, "Take the sleeper bus");
        assert_eq!(parsed.reasoning.as_deref(), Some("Budget first"));
    }

    #[test]
    fn test_reasoning_spans_newlines() {
        let parsed = parse("<reasoning>line one\nline two</reasoning>\n\nDay 1: Hanoi");
        assert_eq!(parsed.reasoning.as_deref(), Some("line one\nline two"));
        assert_eq!(parsed.main, "Day 1: Hanoi");
    }

    #[test]
    fn test_non_greedy_match_keeps_text_between_spans_visible() {
        let parsed = parse("<reasoning>a</reasoning>middle<reasoning>b</reasoning>");
        assert_eq!(parsed.reasoning.as_deref(), Some("a"));
        assert_eq!(parsed.main, "middle");
    }

    #[test]
    fn test_itinerary_tags_stripped_content_kept() {
        let parsed = parse("Here you go:\n<itinerary>\nDay 1: Ha Long Bay\n</ITINERARY>");
        assert_eq!(parsed.main, "Here you go:\n\nDay 1: Ha Long Bay");
        assert_eq!(parsed.reasoning, None);
    }

    #[test]
    fn test_itinerary_and_reasoning_together() {
        let parsed = parse(
            "<reasoning>User likes food</reasoning><itinerary>Day 1: street food tour</itinerary>",
        );
        assert_eq!(parsed.main, "Day 1: street food tour");
        assert_eq!(parsed.reasoning.as_deref(), Some("User likes food"));
    }

    #[test]
    fn test_unclosed_reasoning_tag_left_verbatim() {
        let parsed = parse("<reasoning>never closed. Visit Hue");
        assert_eq!(parsed.main, "<reasoning>never closed. Visit Hue");
        assert_eq!(parsed.reasoning, None);
    }

    #[test]
    fn test_empty_reasoning_span_yields_empty_reasoning() {
        let parsed = parse("<reasoning>   </reasoning>Sapa");
        assert_eq!(parsed.reasoning.as_deref(), Some(""));
        assert_eq!(parsed.visible_reasoning(), None);
        assert_eq!(parsed.main, "Sapa");
    }

    #[test]
    fn test_reasoning_inner_markup_kept_in_reasoning() {
        let parsed = parse("<reasoning>plan <itinerary>x</itinerary></reasoning>Done");
        assert_eq!(parsed.reasoning.as_deref(), Some("plan <itinerary>x</itinerary>"));
        assert_eq!(parsed.main, "Done");
    }

    #[test]
    fn test_idempotence() {
        for text in [
            "",
            "plain",
            "<reasoning>a</reasoning>b",
            "<reasoning>a</reasoning>b<reasoning>c</reasoning>",
            "<reason<itinerary>ing>hidden</reasoning>shown",
            "<reasoning>open only",
            "<itinerary>Day 1</itinerary>",
            "  <reasoning>x</reasoning>  ",
        ] {
            assert_idempotent(text);
        }
    }

    #[test]
    fn test_span_formed_by_tag_removal_is_not_visible() {
        let parsed = parse("<reason<itinerary>ing>hidden</reasoning>shown");
        assert_eq!(parsed.main, "shown");
    }
}
