// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bundle manifest schema.
//!
//! A bundle is a store-only ZIP containing exactly one `manifest.json`
//! plus zero or more `assets/<hash>-<name>` binary entries. The manifest
//! is versioned with a fixed tag; importers reject any other value.
//! Validation fails closed: malformed JSON and schema violations are
//! both hard errors, never partially accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fixed manifest schema tag. Importers must reject any other value.
pub const BUNDLE_VERSION: &str = "spaced-bundle-v1";

/// Archive entry name of the manifest.
pub const MANIFEST_NAME: &str = "manifest.json";

/// Prefix of per-bundle asset placeholders embedded in card text.
pub const PLACEHOLDER_PREFIX: &str = "asset://";

/// Prefix of asset entry names inside the archive.
pub const ASSET_DIR_PREFIX: &str = "assets/";

/// A non-fatal diagnostic carried along in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleWarning {
    pub code: String,
    pub message: String,
    pub file: String,
    pub line: u32,
}

/// One asset referenced from a card's text via a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleAsset {
    /// `asset://img_<n>` token appearing in the card text.
    pub placeholder: String,
    /// Archive path of the asset bytes (`assets/<hash>-<name>`).
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Source location of a card's originating block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleCardSource {
    pub file: String,
    #[serde(rename = "lineStart")]
    pub line_start: u32,
    #[serde(rename = "lineEnd")]
    pub line_end: u32,
}

/// One compiled card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleCard {
    pub front: String,
    pub back: String,
    pub assets: Vec<BundleAsset>,
    pub source: BundleCardSource,
}

/// Provenance of the compiled inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleSource {
    /// Source kind; currently always "obsidian".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "vaultRoot")]
    pub vault_root: String,
    pub inputs: Vec<String>,
}

/// The top-level manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub version: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    pub source: BundleSource,
    pub cards: Vec<BundleCard>,
    #[serde(default)]
    pub warnings: Vec<BundleWarning>,
}

impl BundleManifest {
    /// Validates the schema constraints that serde cannot express.
    ///
    /// Checks the version tag, non-empty card text, positive line numbers,
    /// placeholder and asset-path prefixes, and that every asset
    /// placeholder is unique within its card.
    pub fn validate(&self) -> Result<()> {
        if self.version != BUNDLE_VERSION {
            return Err(Error::InvalidManifest(format!(
                "unsupported version '{}', expected '{BUNDLE_VERSION}'",
                self.version
            )));
        }
        if self.source.vault_root.is_empty() || self.source.inputs.is_empty() {
            return Err(Error::InvalidManifest("source must name a vault root and inputs".into()));
        }

        for (index, card) in self.cards.iter().enumerate() {
            if card.front.is_empty() || card.back.is_empty() {
                return Err(Error::InvalidManifest(format!(
                    "card {index} has empty front or back text"
                )));
            }
            if card.source.file.is_empty()
                || card.source.line_start == 0
                || card.source.line_end == 0
            {
                return Err(Error::InvalidManifest(format!(
                    "card {index} has an invalid source location"
                )));
            }

            let mut seen = std::collections::HashSet::new();
            for asset in &card.assets {
                if !asset.placeholder.starts_with(PLACEHOLDER_PREFIX) {
                    return Err(Error::InvalidManifest(format!(
                        "card {index} asset placeholder '{}' must start with '{PLACEHOLDER_PREFIX}'",
                        asset.placeholder
                    )));
                }
                if !asset.file.starts_with(ASSET_DIR_PREFIX) {
                    return Err(Error::InvalidManifest(format!(
                        "card {index} asset file '{}' must start with '{ASSET_DIR_PREFIX}'",
                        asset.file
                    )));
                }
                if !seen.insert(asset.placeholder.as_str()) {
                    return Err(Error::InvalidManifest(format!(
                        "card {index} repeats asset placeholder '{}'",
                        asset.placeholder
                    )));
                }
            }
        }

        for warning in &self.warnings {
            if warning.code.is_empty() || warning.line == 0 {
                return Err(Error::InvalidManifest("warning entries need a code and line".into()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "bundle_tests.rs"]
mod tests;
