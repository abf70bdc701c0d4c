// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Plain-text flashcard markup parser.
//!
//! The grammar is line-oriented:
//!
//! ```text
//! @reverse          (optional, immediately before Q:)
//! Q: question text
//!    more question lines
//! A: answer text
//!    more answer lines
//! ===
//! ```
//!
//! Escaped markers (`\Q:`, `\A:`, `\===`) are inert during scanning and
//! unescaped to their literal form in the final card text. A closed block
//! expands into one or more cards: one per cloze index if the front
//! contains cloze markers, a forward/reverse pair under `@reverse`, or a
//! single basic card otherwise. All variants from one block share a
//! generated note id so the runtime can bury siblings together.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::cloze::{cloze_indices, expand_cloze};
use crate::diagnostics::{Diagnostic, DiagnosticCode};

#[allow(clippy::expect_used)]
static ESCAPED_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\\(Q:|A:|===)").expect("escaped marker regex"));

/// How a block was expanded into cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Basic,
    Reverse,
    Cloze,
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NoteType::Basic => "basic",
            NoteType::Reverse => "reverse",
            NoteType::Cloze => "cloze",
        };
        write!(f, "{s}")
    }
}

/// Groups the variant cards generated from one source block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardOrigin {
    /// Shared by all variants of the block.
    pub note_id: String,
    pub note_type: NoteType,
    /// Distinguishes variants: "basic", "forward"/"reverse", or "c<N>".
    pub variant_key: String,
}

/// Location of a card's source block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub file: String,
    /// 1-based first line (includes the `@reverse` line when present).
    #[serde(rename = "lineStart")]
    pub line_start: u32,
    /// 1-based line of the closing `===` delimiter.
    #[serde(rename = "lineEnd")]
    pub line_end: u32,
}

/// One card produced by the parser, before asset resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCard {
    pub front: String,
    pub back: String,
    pub source: SourceSpan,
    pub origin: CardOrigin,
}

/// Result of parsing one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub cards: Vec<ParsedCard>,
    pub diagnostics: Vec<Diagnostic>,
}

fn is_question_marker(line: &str) -> bool {
    line.starts_with("Q:")
}

fn is_answer_marker(line: &str) -> bool {
    line.starts_with("A:")
}

fn is_delimiter(line: &str) -> bool {
    line == "==="
}

fn is_reverse_marker(line: &str) -> bool {
    line.trim() == "@reverse"
}

/// Strips a two-character marker plus at most one following space.
fn without_marker(line: &str) -> &str {
    let rest = &line[2..];
    rest.strip_prefix(' ').unwrap_or(rest)
}

/// Restores escaped markers to their literal form. Applied only to final
/// card text, never during scanning, so an escaped delimiter does not
/// close a block.
fn unescape_markers(text: &str) -> String {
    ESCAPED_MARKER_REGEX.replace_all(text, "$1").into_owned()
}

/// Parses flashcard blocks out of markup text.
///
/// `source_file` is the display path recorded in card sources and
/// diagnostics. Scanning recovers from most problems and continues with
/// the next block; a missing closing delimiter is fatal for the rest of
/// the file.
pub fn parse_blocks(content: &str, source_file: &str) -> ParseOutcome {
    let normalized = content.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();
    let mut cards = Vec::new();
    let mut diagnostics = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        // An @reverse modifier is only meaningful immediately before Q:.
        let mut has_reverse = false;
        if is_reverse_marker(lines[i]) {
            if i + 1 < lines.len() && is_question_marker(lines[i + 1]) {
                has_reverse = true;
                i += 1;
            } else {
                i += 1;
                continue;
            }
        }

        if !is_question_marker(lines[i]) {
            i += 1;
            continue;
        }

        // 1-based; the @reverse line is part of the block's source range.
        let line_start = if has_reverse { i as u32 } else { i as u32 + 1 };
        let mut front_lines = vec![without_marker(lines[i]).to_string()];
        i += 1;

        let mut has_answer = false;
        while i < lines.len() {
            if is_answer_marker(lines[i]) {
                has_answer = true;
                break;
            }

            // A bare delimiter before any A: closes the broken block;
            // scanning resumes after it.
            if is_delimiter(lines[i]) {
                i += 1;
                break;
            }

            front_lines.push(lines[i].to_string());
            i += 1;
        }

        // Either the delimiter closed the block early or input ran out.
        if !has_answer {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::MissingAnswer,
                "Card block is missing an A: answer marker.",
                source_file,
                line_start,
            ));
            continue;
        }

        let mut back_lines = vec![without_marker(lines[i]).to_string()];
        i += 1;

        let mut line_end = None;
        while i < lines.len() {
            if is_delimiter(lines[i]) {
                line_end = Some(i as u32 + 1);
                i += 1;
                break;
            }
            back_lines.push(lines[i].to_string());
            i += 1;
        }

        let Some(line_end) = line_end else {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::MissingDelimiter,
                "Card block is missing a terminating === delimiter.",
                source_file,
                line_start,
            ));
            break;
        };

        let front = unescape_markers(&front_lines.join("\n")).trim().to_string();
        let back = unescape_markers(&back_lines.join("\n")).trim().to_string();

        if front.is_empty() || back.is_empty() {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::MalformedCardBlock,
                "Card block must have non-empty Q and A content.",
                source_file,
                line_start,
            ));
            continue;
        }

        let source = SourceSpan { file: source_file.to_string(), line_start, line_end };
        let note_id = Uuid::new_v4().to_string();

        expand_block(
            &front,
            &back,
            source,
            note_id,
            has_reverse,
            source_file,
            &mut cards,
            &mut diagnostics,
        );
    }

    if cards.is_empty() {
        diagnostics.push(Diagnostic::warning(
            DiagnosticCode::NoCardsFound,
            "No flashcards found in file.",
            source_file,
            1,
        ));
    }

    ParseOutcome { cards, diagnostics }
}

/// Expands one closed block into its output cards.
#[allow(clippy::too_many_arguments)]
fn expand_block(
    front: &str,
    back: &str,
    source: SourceSpan,
    note_id: String,
    has_reverse: bool,
    source_file: &str,
    cards: &mut Vec<ParsedCard>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let indices = cloze_indices(front);

    if !indices.is_empty() {
        for index in indices {
            let expanded = expand_cloze(front, index);

            if expanded.front.trim().is_empty() {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::EmptyCloze,
                    format!("Cloze c{index} produces empty front content."),
                    source_file,
                    source.line_start,
                ));
                continue;
            }

            // Back: the question with this cloze revealed (bolded), then
            // the A: text with the same transform, when there is one.
            let card_back = if back.trim().is_empty() {
                expanded.back.clone()
            } else {
                format!("{}\n\n{}", expanded.back, expand_cloze(back, index).back)
            };

            cards.push(ParsedCard {
                front: expanded.front,
                back: card_back,
                source: source.clone(),
                origin: CardOrigin {
                    note_id: note_id.clone(),
                    note_type: NoteType::Cloze,
                    variant_key: format!("c{index}"),
                },
            });
        }
    } else if has_reverse {
        cards.push(ParsedCard {
            front: front.to_string(),
            back: back.to_string(),
            source: source.clone(),
            origin: CardOrigin {
                note_id: note_id.clone(),
                note_type: NoteType::Reverse,
                variant_key: "forward".to_string(),
            },
        });
        cards.push(ParsedCard {
            front: back.to_string(),
            back: front.to_string(),
            source,
            origin: CardOrigin {
                note_id,
                note_type: NoteType::Reverse,
                variant_key: "reverse".to_string(),
            },
        });
    } else {
        cards.push(ParsedCard {
            front: front.to_string(),
            back: back.to_string(),
            source,
            origin: CardOrigin {
                note_id,
                note_type: NoteType::Basic,
                variant_key: "basic".to_string(),
            },
        });
    }
}

#[cfg(test)]
#[path = "markup_tests.rs"]
mod tests;
