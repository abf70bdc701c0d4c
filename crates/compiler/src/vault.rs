// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Vault discovery and asset resolution.
//!
//! A vault is a directory tree of notes and attachments. The vault root is
//! the nearest ancestor of an input file containing a `.obsidian`
//! directory, falling back to the input's own directory. Image targets
//! resolve against a fixed candidate order, then against a case-insensitive
//! basename index over every file under the root; a basename matching more
//! than one file is rejected rather than guessed at.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostics::DiagnosticCode;
use crate::error::Result;
use crate::links::LinkKind;

/// Directory marking a vault root.
const VAULT_MARKER: &str = ".obsidian";

/// A resolved image target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAsset {
    /// A file inside (or reachable from) the vault.
    Local(PathBuf),
    /// An `http(s)://` or `data:` target, left untouched.
    External(String),
}

/// Why a target failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    NotFound { target: String },
    Ambiguous { target: String, candidates: Vec<String> },
}

impl ResolveError {
    /// The diagnostic code this failure maps to.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            ResolveError::NotFound { .. } => DiagnosticCode::AssetNotFound,
            ResolveError::Ambiguous { .. } => DiagnosticCode::AmbiguousWikiLink,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotFound { target } => {
                write!(f, "Could not resolve image link: {target}")
            }
            ResolveError::Ambiguous { target, candidates } => {
                write!(f, "Multiple files matched {target}: {}", candidates.join(", "))
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct VaultAppConfig {
    #[serde(rename = "attachmentFolderPath")]
    attachment_folder_path: Option<String>,
}

/// An opened vault: root, attachment folder config, and basename index.
pub struct Vault {
    root: PathBuf,
    attachment_folder: Option<String>,
    /// Lowercased basename -> absolute paths, over every file in the vault.
    basename_index: HashMap<String, Vec<PathBuf>>,
}

/// Walks upward from an input file looking for a vault marker directory.
///
/// Falls back to the input's own directory when no marker is found.
pub fn find_vault_root(input_file: &Path) -> PathBuf {
    let fallback = input_file.parent().unwrap_or(Path::new(".")).to_path_buf();

    let mut current = fallback.clone();
    loop {
        if current.join(VAULT_MARKER).is_dir() {
            return current;
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return fallback,
        }
    }
}

impl Vault {
    /// Opens a vault: reads the attachment folder configuration and builds
    /// the basename index in one pass over the tree.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        let mut basename_index: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for entry in WalkDir::new(&root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let basename = entry.file_name().to_string_lossy().to_lowercase();
            basename_index.entry(basename).or_default().push(entry.path().to_path_buf());
        }

        Ok(Vault { attachment_folder: read_attachment_folder(&root), root, basename_index })
    }

    /// Returns the vault root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns a vault-relative display path with forward slashes.
    pub fn display_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let parts: Vec<String> =
            relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
        parts.join("/")
    }

    /// Resolves an image target relative to a source file.
    ///
    /// External schemes never touch the filesystem. Local candidates are
    /// probed in order (source-relative or root-relative, the configured
    /// attachment folder, then root-relative for paths with separators);
    /// the basename index is the last resort.
    pub fn resolve(
        &self,
        source_file: &Path,
        target: &str,
        kind: LinkKind,
    ) -> std::result::Result<ResolvedAsset, ResolveError> {
        if is_external_target(target) {
            return Ok(ResolvedAsset::External(target.to_string()));
        }

        let normalized = percent_decode(target.trim());
        let has_separator = normalized.contains('/') || normalized.contains('\\');
        let source_dir = source_file.parent().unwrap_or(Path::new("."));

        let mut candidates: Vec<PathBuf> = Vec::new();
        if kind == LinkKind::Markdown && normalized.starts_with('/') {
            candidates.push(normalize_path(&self.root.join(normalized.trim_start_matches('/'))));
        } else {
            candidates.push(normalize_path(&source_dir.join(&normalized)));
        }
        if let Some(folder) = &self.attachment_folder {
            candidates.push(normalize_path(&self.root.join(folder).join(&normalized)));
        }
        if has_separator {
            candidates.push(normalize_path(&self.root.join(&normalized)));
        }
        candidates.dedup();

        for candidate in &candidates {
            if candidate.is_file() {
                return Ok(ResolvedAsset::Local(candidate.clone()));
            }
        }

        let basename = Path::new(&normalized)
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match self.basename_index.get(&basename).map(Vec::as_slice) {
            Some([single]) => Ok(ResolvedAsset::Local(single.clone())),
            Some(matches) if matches.len() > 1 => {
                let mut candidates: Vec<String> =
                    matches.iter().map(|p| self.display_path(p)).collect();
                candidates.sort();
                Err(ResolveError::Ambiguous { target: target.to_string(), candidates })
            }
            _ => Err(ResolveError::NotFound { target: target.to_string() }),
        }
    }
}

fn read_attachment_folder(root: &Path) -> Option<String> {
    let config_path = root.join(VAULT_MARKER).join("app.json");
    let content = fs::read_to_string(config_path).ok()?;
    let config: VaultAppConfig = serde_json::from_str(&content).ok()?;
    config.attachment_folder_path.filter(|folder| !folder.trim().is_empty())
}

fn is_external_target(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:")
}

/// Decodes %XX escapes; invalid sequences pass through literally.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3).and_then(|pair| {
                let s = std::str::from_utf8(pair).ok()?;
                u8::from_str_radix(s, 16).ok()
            });
            if let Some(byte) = hex {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Collapses `.` and `..` components without touching the filesystem.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[path = "vault_tests.rs"]
mod tests;
