// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! spaced-compiler: Plain-text-to-flashcard compiler and bundle format
//!
//! This crate turns markup files in a vault into a portable, verifiable
//! bundle: a line-oriented block parser with cloze and reverse expansion,
//! an asset resolver over the vault's file tree, a store-only ZIP codec,
//! and a versioned JSON manifest with packaging and import on both ends.

pub mod bundle;
pub mod cloze;
pub mod diagnostics;
pub mod error;
pub mod import;
pub mod links;
pub mod markup;
pub mod package;
pub mod vault;
pub mod zip;

pub use bundle::{
    BundleAsset, BundleCard, BundleCardSource, BundleManifest, BundleSource, BundleWarning,
    BUNDLE_VERSION, MANIFEST_NAME,
};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use error::{Error, Result};
pub use import::{fingerprint, parse_bundle, replace_placeholder_links, ParsedBundle};
pub use links::{find_image_links, ImageLink, LinkKind};
pub use markup::{parse_blocks, CardOrigin, NoteType, ParseOutcome, ParsedCard, SourceSpan};
pub use package::{compile, rewrite_assets, AssetRegistry, Compilation};
pub use vault::{find_vault_root, ResolveError, ResolvedAsset, Vault};
pub use zip::{create_zip, read_zip, ZipEntry};
