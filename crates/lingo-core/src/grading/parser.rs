//! Tokenizer for inline answer markup.
//!
//! Test content embeds blanks in two forms, matched in this order with
//! first match winning per span:
//!
//! 1. Dropdown: `#[opt_a, opt_b, ...] correct#`
//! 2. Free text: `[correct]`
//!
//! A single left-to-right pass per line assigns sequential question ids
//! (`q1`, `q2`, ...) shared across both forms, so re-parsing the same
//! content always reproduces identical ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, LingoError, LingoResult};
use crate::normalize::normalize;

/// The answer widget a blank renders to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlankKind {
    /// Text input graded against one reference answer.
    FreeText { answer: String },
    /// Select graded against the marked correct option.
    Dropdown { options: Vec<String>, answer: String },
}

/// One gap in the test content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blank {
    /// Sequential question id, `q1` onward.
    pub id: String,
    #[serde(flatten)]
    pub kind: BlankKind,
}

impl Blank {
    /// The reference answer for this blank.
    pub fn answer(&self) -> &str {
        match &self.kind {
            BlankKind::FreeText { answer } => answer,
            BlankKind::Dropdown { answer, .. } => answer,
        }
    }
}

/// A run of literal text or a blank, in content order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text { text: String },
    Blank(Blank),
}

/// A blank as presented to the client, without its reference answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetKind {
    FreeText,
    Dropdown { options: Vec<String> },
}

/// Client-facing form of a [`Blank`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlankWidget {
    pub id: String,
    #[serde(flatten)]
    pub kind: WidgetKind,
}

/// Client-facing form of a [`Segment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderSegment {
    Text { text: String },
    Blank(BlankWidget),
}

/// Parsed test content: lines of segments plus the derived answer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedTest {
    pub lines: Vec<Vec<Segment>>,
}

impl ParsedTest {
    /// All blanks in question-id order.
    pub fn blanks(&self) -> Vec<&Blank> {
        self.lines
            .iter()
            .flatten()
            .filter_map(|segment| match segment {
                Segment::Blank(blank) => Some(blank),
                Segment::Text { .. } => None,
            })
            .collect()
    }

    /// Question id to correct answer. Derived per request, never persisted.
    pub fn answer_key(&self) -> HashMap<String, String> {
        self.blanks()
            .into_iter()
            .map(|blank| (blank.id.clone(), blank.answer().to_string()))
            .collect()
    }

    /// Number of question ids assigned.
    pub fn total_questions(&self) -> u32 {
        self.blanks().len() as u32
    }

    /// Renderable lines with the reference answers stripped.
    ///
    /// This is what an unanswered render sends to the client; the
    /// correct-answer table travels only with graded responses.
    pub fn widgets(&self) -> Vec<Vec<RenderSegment>> {
        self.lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|segment| match segment {
                        Segment::Text { text } => RenderSegment::Text { text: text.clone() },
                        Segment::Blank(blank) => RenderSegment::Blank(BlankWidget {
                            id: blank.id.clone(),
                            kind: match &blank.kind {
                                BlankKind::FreeText { .. } => WidgetKind::FreeText,
                                BlankKind::Dropdown { options, .. } => WidgetKind::Dropdown {
                                    options: options.clone(),
                                },
                            },
                        }),
                    })
                    .collect()
            })
            .collect()
    }
}

/// Parse test content into typed segments.
///
/// Returns a validation error for malformed markup: an empty reference
/// answer, an empty option list, or a dropdown whose correct value does
/// not normalize-equal any listed option.
pub fn parse_test_content(content: &str) -> LingoResult<ParsedTest> {
    let mut counter = 0u32;
    let mut lines = Vec::new();
    for line in content.lines() {
        lines.push(parse_line(line, &mut counter)?);
    }
    Ok(ParsedTest { lines })
}

fn parse_line(line: &str, counter: &mut u32) -> LingoResult<Vec<Segment>> {
    let chars: Vec<char> = line.chars().collect();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while pos < chars.len() {
        let matched = match chars[pos] {
            '#' => try_dropdown(&chars, pos)?,
            '[' => try_free_text(&chars, pos)?,
            _ => None,
        };

        match matched {
            Some((kind, consumed)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Text {
                        text: std::mem::take(&mut literal),
                    });
                }
                *counter += 1;
                segments.push(Segment::Blank(Blank {
                    id: format!("q{}", counter),
                    kind,
                }));
                pos = consumed;
            }
            None => {
                literal.push(chars[pos]);
                pos += 1;
            }
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Text { text: literal });
    }
    Ok(segments)
}

/// Try to match `#[opt, ...] correct#` starting at `start` (a `#`).
///
/// Returns the blank and the position just past the closing `#`, or
/// `None` when the span is not dropdown markup (the `#` is then literal).
fn try_dropdown(chars: &[char], start: usize) -> LingoResult<Option<(BlankKind, usize)>> {
    let mut pos = start + 1;
    while pos < chars.len() && chars[pos].is_whitespace() {
        pos += 1;
    }
    if pos >= chars.len() || chars[pos] != '[' {
        return Ok(None);
    }

    let options_start = pos + 1;
    let options_end = match find(chars, options_start, ']') {
        Some(i) => i,
        None => return Ok(None),
    };
    let answer_end = match find(chars, options_end + 1, '#') {
        Some(i) => i,
        None => return Ok(None),
    };

    let options_str: String = chars[options_start..options_end].iter().collect();
    let options: Vec<String> = options_str
        .split(',')
        .map(|opt| opt.trim().to_string())
        .filter(|opt| !opt.is_empty())
        .collect();
    if options.is_empty() {
        return Err(LingoError::parse(
            "dropdown has no options",
            ErrorCode::ParseBadDropdown,
        ));
    }

    let answer: String = chars[options_end + 1..answer_end]
        .iter()
        .collect::<String>()
        .trim()
        .to_string();
    if answer.is_empty() {
        return Err(LingoError::parse(
            "dropdown has no correct value",
            ErrorCode::ParseEmptyBlank,
        ));
    }
    if !options.iter().any(|opt| normalize(opt) == normalize(&answer)) {
        return Err(LingoError::parse(
            format!("dropdown correct value '{}' is not among its options", answer),
            ErrorCode::ParseBadDropdown,
        ));
    }

    Ok(Some((BlankKind::Dropdown { options, answer }, answer_end + 1)))
}

/// Try to match `[correct]` starting at `start` (a `[`).
fn try_free_text(chars: &[char], start: usize) -> LingoResult<Option<(BlankKind, usize)>> {
    let end = match find(chars, start + 1, ']') {
        Some(i) => i,
        None => return Ok(None),
    };
    if end == start + 1 {
        // "[]" is literal text, not a blank
        return Ok(None);
    }

    let answer: String = chars[start + 1..end]
        .iter()
        .collect::<String>()
        .trim()
        .to_string();
    if answer.is_empty() {
        return Err(LingoError::parse(
            "blank has an empty reference answer",
            ErrorCode::ParseEmptyBlank,
        ));
    }
    Ok(Some((BlankKind::FreeText { answer }, end + 1)))
}

fn find(chars: &[char], from: usize, needle: char) -> Option<usize> {
    chars[from..]
        .iter()
        .position(|c| *c == needle)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_text_blank() {
        let parsed = parse_test_content("The cat sat on the [mat].").unwrap();
        let blanks = parsed.blanks();
        assert_eq!(blanks.len(), 1);
        assert_eq!(blanks[0].id, "q1");
        assert_eq!(
            blanks[0].kind,
            BlankKind::FreeText {
                answer: "mat".to_string()
            }
        );
    }

    #[test]
    fn test_dropdown_blank() {
        let parsed = parse_test_content("Capital: #[Paris, London] Paris#").unwrap();
        let blanks = parsed.blanks();
        assert_eq!(blanks.len(), 1);
        assert_eq!(
            blanks[0].kind,
            BlankKind::Dropdown {
                options: vec!["Paris".to_string(), "London".to_string()],
                answer: "Paris".to_string()
            }
        );
    }

    #[test]
    fn test_ids_are_sequential_across_kinds_and_lines() {
        let content = "First [one] and #[a, b] a#.\nThen [two].";
        let parsed = parse_test_content(content).unwrap();
        let ids: Vec<&str> = parsed.blanks().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn test_reparse_reproduces_identical_ids() {
        let content = "A [x] B #[y, z] y# C [w]";
        let first = parse_test_content(content).unwrap();
        let second = parse_test_content(content).unwrap();
        assert_eq!(first.answer_key(), second.answer_key());
    }

    #[test]
    fn test_literal_text_preserved_around_blanks() {
        let parsed = parse_test_content("before [x] after").unwrap();
        match &parsed.lines[0][0] {
            Segment::Text { text } => assert_eq!(text, "before "),
            other => panic!("expected text, got {:?}", other),
        }
        match &parsed.lines[0][2] {
            Segment::Text { text } => assert_eq!(text, " after"),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_markup_is_literal() {
        let parsed = parse_test_content("a [b and # c").unwrap();
        assert_eq!(parsed.total_questions(), 0);
        match &parsed.lines[0][0] {
            Segment::Text { text } => assert_eq!(text, "a [b and # c"),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_hash_without_dropdown_then_free_text() {
        // The '#' fails to parse as a dropdown, so the bracket span is
        // picked up by the free-text rule.
        let parsed = parse_test_content("# not a dropdown [answer]").unwrap();
        let blanks = parsed.blanks();
        assert_eq!(blanks.len(), 1);
        assert_eq!(blanks[0].answer(), "answer");
    }

    #[test]
    fn test_dropdown_correct_value_must_be_an_option() {
        let err = parse_test_content("#[Paris, London] Berlin#").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParseBadDropdown);
    }

    #[test]
    fn test_dropdown_correct_value_matches_accent_insensitively() {
        let parsed = parse_test_content("#[Café, Tea] cafe#").unwrap();
        assert_eq!(parsed.total_questions(), 1);
    }

    #[test]
    fn test_empty_answer_is_rejected() {
        let err = parse_test_content("a [  ] b").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParseEmptyBlank);
    }

    #[test]
    fn test_answer_key() {
        let parsed = parse_test_content("[un] #[a, b] b# [deux]").unwrap();
        let key = parsed.answer_key();
        assert_eq!(key.len(), 3);
        assert_eq!(key["q1"], "un");
        assert_eq!(key["q2"], "b");
        assert_eq!(key["q3"], "deux");
    }

    #[test]
    fn test_empty_brackets_are_literal() {
        let parsed = parse_test_content("array[] indexing").unwrap();
        assert_eq!(parsed.total_questions(), 0);
    }

    #[test]
    fn test_widgets_do_not_carry_answers() {
        let parsed = parse_test_content("[mat] and #[a, b] b#").unwrap();
        let widgets = parsed.widgets();
        let rendered = serde_json::to_string(&widgets).unwrap();
        assert!(!rendered.contains("mat"));
        match &widgets[0][2] {
            RenderSegment::Blank(widget) => {
                assert_eq!(widget.id, "q2");
                assert_eq!(
                    widget.kind,
                    WidgetKind::Dropdown {
                        options: vec!["a".to_string(), "b".to_string()]
                    }
                );
            }
            other => panic!("expected blank widget, got {:?}", other),
        }
    }
}
