// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bundle packaging: parsed cards + resolved assets -> archive bytes.
//!
//! Assets dedup on their resolved absolute path: byte-identical images
//! referenced from several cards are stored once, under
//! `assets/<hash8>-<sanitized-basename>`. Placeholders (`asset://img_<n>`)
//! are assigned per unique asset in registration order, bundle-wide, and
//! each card's asset list carries exactly one entry per placeholder its
//! text references.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bundle::{
    BundleAsset, BundleCard, BundleCardSource, BundleManifest, BundleSource, BundleWarning,
    BUNDLE_VERSION, MANIFEST_NAME,
};
use crate::diagnostics::{Diagnostic, Severity};
use crate::error::{Error, Result};
use crate::links::{find_image_links, LinkKind};
use crate::markup::{parse_blocks, CardOrigin};
use crate::vault::{ResolvedAsset, Vault};
use crate::zip::{create_zip, ZipEntry};

/// One unique asset collected during packaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAsset {
    /// Bundle-wide placeholder token (`asset://img_<n>`).
    pub placeholder: String,
    /// Archive entry name (`assets/<hash8>-<name>`).
    pub archive_path: String,
    pub bytes: Vec<u8>,
}

/// Deduplicating asset collection, keyed by resolved absolute path.
#[derive(Default)]
pub struct AssetRegistry {
    by_path: HashMap<PathBuf, usize>,
    assets: Vec<RegisteredAsset>,
}

impl AssetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resolved asset file, reading its bytes on first sight.
    ///
    /// The same absolute path always maps to the same placeholder and
    /// archive name.
    pub fn register(&mut self, absolute: &Path) -> Result<&RegisteredAsset> {
        if let Some(&index) = self.by_path.get(absolute) {
            return Ok(&self.assets[index]);
        }

        let bytes = fs::read(absolute)?;
        let digest = Sha256::digest(&bytes);
        let hash = hex::encode(&digest[..8]);
        let basename = absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "asset".to_string());

        let asset = RegisteredAsset {
            placeholder: format!("asset://img_{}", self.assets.len() + 1),
            archive_path: format!("assets/{hash}-{}", sanitize_file_name(&basename)),
            bytes,
        };
        debug!(path = %absolute.display(), archive_path = %asset.archive_path, "registered asset");

        let index = self.assets.len();
        self.by_path.insert(absolute.to_path_buf(), index);
        self.assets.push(asset);
        Ok(&self.assets[index])
    }

    /// Returns the registered assets in registration order.
    pub fn assets(&self) -> &[RegisteredAsset] {
        &self.assets
    }

    /// Returns the number of unique assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns true when no assets have been registered.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Replaces characters outside `[a-zA-Z0-9._-]` with `-`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '-' })
        .collect()
}

/// Markdown with image links swapped for placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct RewrittenMarkdown {
    pub text: String,
    pub assets: Vec<BundleAsset>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolves and rewrites every image link in one side of a card.
///
/// Unresolvable links stay as raw text and produce an error diagnostic at
/// their source line; external links pass through untouched.
pub fn rewrite_assets(
    markdown: &str,
    source_file: &Path,
    display_path: &str,
    line_base: u32,
    vault: &Vault,
    registry: &mut AssetRegistry,
) -> Result<RewrittenMarkdown> {
    let links = find_image_links(markdown);
    if links.is_empty() {
        return Ok(RewrittenMarkdown {
            text: markdown.to_string(),
            assets: Vec::new(),
            diagnostics: Vec::new(),
        });
    }

    let mut text = String::new();
    let mut assets: Vec<BundleAsset> = Vec::new();
    let mut diagnostics = Vec::new();
    let mut cursor = 0;

    for link in links {
        text.push_str(&markdown[cursor..link.start]);
        cursor = link.end;

        let resolved = match vault.resolve(source_file, &link.target, link.kind) {
            Ok(resolved) => resolved,
            Err(err) => {
                diagnostics.push(Diagnostic::error(
                    err.code(),
                    err.to_string(),
                    display_path,
                    line_base + link.line - 1,
                ));
                text.push_str(&link.raw);
                continue;
            }
        };

        let absolute = match resolved {
            ResolvedAsset::External(_) => {
                text.push_str(&link.raw);
                continue;
            }
            ResolvedAsset::Local(path) => path,
        };

        let registered = registry.register(&absolute)?;
        let alt = match link.kind {
            LinkKind::Markdown if !link.alt.is_empty() => link.alt.clone(),
            _ => default_alt_text(&link.target),
        };

        if !assets.iter().any(|a| a.placeholder == registered.placeholder) {
            assets.push(BundleAsset {
                placeholder: registered.placeholder.clone(),
                file: registered.archive_path.clone(),
                alt: Some(alt.clone()),
            });
        }

        text.push_str(&format!("![{alt}]({})", registered.placeholder));
    }

    text.push_str(&markdown[cursor..]);
    Ok(RewrittenMarkdown { text, assets, diagnostics })
}

/// Alt text fallback: the target's file stem, or "Image".
fn default_alt_text(target: &str) -> String {
    Path::new(target)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "Image".to_string())
}

/// Result of compiling a set of vault inputs.
pub struct Compilation {
    pub cards: Vec<BundleCard>,
    /// Origins parallel to `cards`, for callers that create live cards.
    pub origins: Vec<CardOrigin>,
    pub diagnostics: Vec<Diagnostic>,
    registry: AssetRegistry,
    vault_root: String,
    inputs: Vec<String>,
}

impl Compilation {
    /// Returns true if any error-severity diagnostic was produced.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Returns the number of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Returns the number of warning-severity diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    /// Returns the number of unique packed assets.
    pub fn asset_count(&self) -> usize {
        self.registry.len()
    }

    /// Builds the manifest for this compilation.
    pub fn manifest(&self, generated_at: DateTime<Utc>) -> BundleManifest {
        BundleManifest {
            version: BUNDLE_VERSION.to_string(),
            generated_at,
            source: BundleSource {
                kind: "obsidian".to_string(),
                vault_root: self.vault_root.clone(),
                inputs: self.inputs.clone(),
            },
            cards: self.cards.clone(),
            warnings: self
                .diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Warning)
                .map(|d| BundleWarning {
                    code: d.code.to_string(),
                    message: d.message.clone(),
                    file: d.file.clone(),
                    line: d.line,
                })
                .collect(),
        }
    }

    /// Serializes the compilation into archive bytes.
    ///
    /// Error diagnostics block bundle production; strict handling of
    /// warnings is the caller's policy.
    pub fn into_archive(self, generated_at: DateTime<Utc>) -> Result<Vec<u8>> {
        let errors = self.error_count();
        if errors > 0 {
            return Err(Error::CompilationFailed { errors });
        }

        let manifest = self.manifest(generated_at);
        let manifest_json = serde_json::to_vec_pretty(&manifest)?;

        let mut entries = vec![ZipEntry::new(MANIFEST_NAME, manifest_json)];
        for asset in self.registry.assets {
            entries.push(ZipEntry::new(asset.archive_path, asset.bytes));
        }

        Ok(create_zip(&entries, generated_at))
    }
}

/// Compiles markup files from one vault into cards, diagnostics, and a
/// deduplicated asset set.
pub fn compile(vault: &Vault, inputs: &[PathBuf]) -> Result<Compilation> {
    let mut cards = Vec::new();
    let mut origins = Vec::new();
    let mut diagnostics = Vec::new();
    let mut registry = AssetRegistry::new();

    for input in inputs {
        let display = vault.display_path(input);
        let content = fs::read_to_string(input)?;
        let parsed = parse_blocks(&content, &display);
        diagnostics.extend(parsed.diagnostics);

        for card in parsed.cards {
            let front = rewrite_assets(
                &card.front,
                input,
                &display,
                card.source.line_start,
                vault,
                &mut registry,
            )?;
            let back = rewrite_assets(
                &card.back,
                input,
                &display,
                card.source.line_start,
                vault,
                &mut registry,
            )?;

            diagnostics.extend(front.diagnostics);
            diagnostics.extend(back.diagnostics);

            let mut assets = front.assets;
            for asset in back.assets {
                if !assets.iter().any(|a| a.placeholder == asset.placeholder) {
                    assets.push(asset);
                }
            }

            cards.push(BundleCard {
                front: front.text,
                back: back.text,
                assets,
                source: BundleCardSource {
                    file: card.source.file,
                    line_start: card.source.line_start,
                    line_end: card.source.line_end,
                },
            });
            origins.push(card.origin);
        }
    }

    Ok(Compilation {
        cards,
        origins,
        diagnostics,
        registry,
        vault_root: vault.root().to_string_lossy().into_owned(),
        inputs: inputs.iter().map(|p| p.to_string_lossy().into_owned()).collect(),
    })
}

#[cfg(test)]
#[path = "package_tests.rs"]
mod tests;
