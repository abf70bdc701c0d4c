// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded image link extraction.
//!
//! Two syntaxes are recognized: wiki-style embeds `![[target]]` (with an
//! optional `|alias` suffix, which is stripped) and standard markdown
//! images `![alt](target)` (with optional `<angle-bracket>` wrapping of
//! the target). Matches are non-overlapping and returned in document
//! order with byte offsets and 1-based line numbers.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static IMAGE_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[\[([^\]]+)\]\]|!\[([^\]]*)\]\(([^)]+)\)").expect("image link regex")
});

/// Which syntax produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Wiki,
    Markdown,
}

/// One embedded image link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLink {
    /// The full matched text.
    pub raw: String,
    /// Byte offset of the match start.
    pub start: usize,
    /// Byte offset one past the match end.
    pub end: usize,
    /// 1-based line number of the match start.
    pub line: u32,
    pub kind: LinkKind,
    /// Alt text; empty for wiki links.
    pub alt: String,
    /// Normalized link target.
    pub target: String,
}

/// Byte offsets at which each line starts.
fn line_starts(input: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, byte) in input.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// Maps a byte offset to a 1-based line number by binary search.
fn offset_to_line(offset: usize, starts: &[usize]) -> u32 {
    starts.partition_point(|&start| start <= offset) as u32
}

fn normalize_wiki_target(target: &str) -> String {
    target.split('|').next().unwrap_or(target).trim().to_string()
}

fn normalize_markdown_target(target: &str) -> String {
    let trimmed = target.trim();
    match trimmed.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
        Some(inner) => inner.to_string(),
        None => trimmed.to_string(),
    }
}

/// Finds all embedded image links in the markdown, in document order.
pub fn find_image_links(markdown: &str) -> Vec<ImageLink> {
    let starts = line_starts(markdown);

    IMAGE_LINK_REGEX
        .captures_iter(markdown)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            let line = offset_to_line(full.start(), &starts);

            if let Some(wiki_target) = caps.get(1) {
                return Some(ImageLink {
                    raw: full.as_str().to_string(),
                    start: full.start(),
                    end: full.end(),
                    line,
                    kind: LinkKind::Wiki,
                    alt: String::new(),
                    target: normalize_wiki_target(wiki_target.as_str()),
                });
            }

            Some(ImageLink {
                raw: full.as_str().to_string(),
                start: full.start(),
                end: full.end(),
                line,
                kind: LinkKind::Markdown,
                alt: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
                target: normalize_markdown_target(caps.get(3).map(|m| m.as_str()).unwrap_or_default()),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "links_tests.rs"]
mod tests;
