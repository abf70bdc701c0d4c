// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bundle import: decode, validate, and rehydrate compiled cards.
//!
//! The inverse of packaging. Decoding requires a `manifest.json` entry
//! whose version tag matches exactly; malformed JSON and schema
//! violations fail closed. After the caller uploads or extracts assets,
//! [`replace_placeholder_links`] maps every `asset://img_<n>` token back
//! to a real URL, and [`fingerprint`] gives a content hash for duplicate
//! detection (whether to skip matches is the caller's policy).

use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

use crate::bundle::{BundleCard, BundleManifest, MANIFEST_NAME};
use crate::error::{Error, Result};
use crate::zip::read_zip;

/// A decoded and validated bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBundle {
    pub manifest: BundleManifest,
    /// All archive entries by name, including the manifest itself.
    pub entries: BTreeMap<String, Vec<u8>>,
}

impl ParsedBundle {
    /// Returns the bytes of an asset entry referenced by a card.
    pub fn asset_bytes(&self, card: &BundleCard, file: &str) -> Result<&[u8]> {
        self.entries.get(file).map(Vec::as_slice).ok_or_else(|| {
            Error::MissingAsset(format!(
                "{} for {}:{}",
                file, card.source.file, card.source.line_start
            ))
        })
    }
}

/// Decodes bundle bytes into a validated manifest plus raw entries.
pub fn parse_bundle(bytes: &[u8]) -> Result<ParsedBundle> {
    let entries = read_zip(bytes)?;

    let manifest_bytes = entries.get(MANIFEST_NAME).ok_or(Error::MissingManifest)?;
    let manifest: BundleManifest = serde_json::from_slice(manifest_bytes)
        .map_err(|err| Error::InvalidManifest(format!("manifest.json is not valid: {err}")))?;
    manifest.validate()?;

    Ok(ParsedBundle { manifest, entries })
}

/// Substitutes every asset placeholder in a card's text.
///
/// A replacement that is itself a full markdown image token replaces the
/// whole enclosing `![alt](placeholder)` token, so substitution never
/// produces nested image syntax. Every placeholder in the card's asset
/// list must have a replacement; a missing one is a hard error.
pub fn replace_placeholder_links(
    card: &BundleCard,
    replacements: &HashMap<String, String>,
) -> Result<(String, String)> {
    let mut front = card.front.clone();
    let mut back = card.back.clone();

    for asset in &card.assets {
        let replacement = replacements
            .get(&asset.placeholder)
            .ok_or_else(|| Error::MissingReplacement(asset.placeholder.clone()))?;

        front = replace_in_markdown(&front, &asset.placeholder, replacement)?;
        back = replace_in_markdown(&back, &asset.placeholder, replacement)?;
    }

    Ok((front, back))
}

fn replace_in_markdown(markdown: &str, placeholder: &str, replacement: &str) -> Result<String> {
    if !replacement.starts_with("![") {
        return Ok(markdown.replace(placeholder, replacement));
    }

    // The replacement is already an image token: swap out the whole
    // enclosing token to avoid nesting like ![alt](![alt](url)).
    let pattern = format!(r"!\[[^\]]*\]\({}\)", regex::escape(placeholder));
    let image_token =
        Regex::new(&pattern).map_err(|err| Error::InvalidManifest(err.to_string()))?;

    let replaced = image_token.replace_all(markdown, replacement);
    if replaced != markdown {
        return Ok(replaced.into_owned());
    }

    Ok(markdown.replace(placeholder, replacement))
}

/// Normalizes card text for fingerprinting: image URLs collapse to a
/// constant, line endings normalize, trailing whitespace drops.
pub fn normalize_content(markdown: &str) -> String {
    #[allow(clippy::expect_used)]
    static IMAGE_REGEX: std::sync::LazyLock<Regex> =
        std::sync::LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("image regex"));

    let constant_urls = IMAGE_REGEX.replace_all(markdown, "![$1](image)");
    let normalized = constant_urls.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.split('\n').map(str::trim_end).collect();
    lines.join("\n").trim().to_string()
}

/// Content fingerprint over both sides of a card.
///
/// Byte-identical up to image URLs, line endings, and trailing
/// whitespace; used by import policies to detect duplicates.
pub fn fingerprint(front: &str, back: &str) -> String {
    let payload = format!("{}\n---\n{}", normalize_content(front), normalize_content(back));
    hex::encode(Sha256::digest(payload.as_bytes()))
}

#[cfg(test)]
#[path = "import_tests.rs"]
mod tests;
