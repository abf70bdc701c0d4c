// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Compiler diagnostics.
//!
//! Parse and resolution problems are accumulated, not thrown: each carries
//! a stable code, a severity, and a file/line location so callers can
//! render them. Errors block bundle production; warnings are advisory
//! unless strict mode is requested.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable diagnostic codes shared between the compiler and bundle format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// A card block with empty question or answer content.
    MalformedCardBlock,
    /// A `Q:` block with no `A:` marker before the delimiter or EOF.
    MissingAnswer,
    /// A card block with no terminating `===` delimiter (fatal for the
    /// rest of the file).
    MissingDelimiter,
    /// An image link that resolved to no file.
    AssetNotFound,
    /// A basename-only link matching more than one vault file.
    AmbiguousWikiLink,
    /// A file that produced no cards at all.
    NoCardsFound,
    /// A cloze variant whose front expands to empty text.
    EmptyCloze,
}

impl DiagnosticCode {
    /// Returns the stable wire/display form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::MalformedCardBlock => "MALFORMED_CARD_BLOCK",
            DiagnosticCode::MissingAnswer => "MISSING_ANSWER",
            DiagnosticCode::MissingDelimiter => "MISSING_DELIMITER",
            DiagnosticCode::AssetNotFound => "ASSET_NOT_FOUND",
            DiagnosticCode::AmbiguousWikiLink => "AMBIGUOUS_WIKI_LINK",
            DiagnosticCode::NoCardsFound => "NO_CARDS_FOUND",
            DiagnosticCode::EmptyCloze => "EMPTY_CLOZE",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One diagnostic, located in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    pub severity: Severity,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    pub fn error(
        code: DiagnosticCode,
        message: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Diagnostic { code, message: message.into(), file: file.into(), line, severity: Severity::Error }
    }

    /// Creates a warning diagnostic.
    pub fn warning(
        code: DiagnosticCode,
        message: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Diagnostic {
            code,
            message: message.into(),
            file: file.into(),
            line,
            severity: Severity::Warning,
        }
    }

    /// Returns true for error-severity diagnostics.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
        };
        write!(f, "[{tag}] {} {}:{} {}", self.code, self.file, self.line, self.message)
    }
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod tests;
