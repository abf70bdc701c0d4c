// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cloze deletion parsing and expansion.
//!
//! Cloze markers use the `{{cN::answer}}` or `{{cN::answer::hint}}`
//! notation. One block expands into one card per distinct index N: the
//! active index is blanked out on the front (`[...]`, or `[hint: ...]`
//! when a hint is given) and bolded on the back, while every other index
//! shows its literal answer text on both sides.

use regex::{Captures, Regex};
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static CLOZE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{c(\d+)::([^:}]+?)(?:::([^}]+?))?\}\}").expect("cloze regex"));

/// One cloze marker found in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClozeMatch {
    pub index: u32,
    pub answer: String,
    pub hint: Option<String>,
}

/// Returns all cloze markers in document order.
pub fn parse_cloze_markers(text: &str) -> Vec<ClozeMatch> {
    CLOZE_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let index = caps.get(1)?.as_str().parse().ok()?;
            Some(ClozeMatch {
                index,
                answer: caps.get(2).map(|m| m.as_str().to_string())?,
                hint: caps.get(3).map(|m| m.as_str().to_string()),
            })
        })
        .collect()
}

/// Returns the distinct cloze indices in the text, sorted ascending.
pub fn cloze_indices(text: &str) -> Vec<u32> {
    let mut indices: Vec<u32> = parse_cloze_markers(text).iter().map(|m| m.index).collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Front and back renderings of a cloze text for one active index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClozeExpansion {
    pub front: String,
    pub back: String,
}

/// Expands cloze text for a specific active index.
///
/// Active markers become `[...]` (or `[hint: ...]`) on the front and
/// `**answer**` on the back; inactive markers collapse to their bare
/// answer text on both sides.
pub fn expand_cloze(text: &str, active_index: u32) -> ClozeExpansion {
    let front = CLOZE_REGEX.replace_all(text, |caps: &Captures<'_>| {
        let index: u32 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        let answer = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if index == active_index {
            match caps.get(3) {
                Some(hint) => format!("[hint: {}]", hint.as_str()),
                None => "[...]".to_string(),
            }
        } else {
            answer.to_string()
        }
    });

    let back = CLOZE_REGEX.replace_all(text, |caps: &Captures<'_>| {
        let index: u32 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        let answer = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if index == active_index {
            format!("**{answer}**")
        } else {
            answer.to_string()
        }
    });

    ClozeExpansion { front: front.into_owned(), back: back.into_owned() }
}

#[cfg(test)]
#[path = "cloze_tests.rs"]
mod tests;
