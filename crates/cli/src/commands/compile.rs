// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{Local, Utc};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use spaced_compiler::{compile, find_vault_root, Vault};

use crate::error::{Error, Result};

pub fn run(inputs: &[String], out: Option<&Path>, strict: bool) -> Result<()> {
    let files = expand_inputs(inputs)?;
    if files.is_empty() {
        return Err(Error::NoInputs);
    }

    let roots: BTreeSet<PathBuf> = files.iter().map(|f| find_vault_root(f)).collect();
    if roots.len() != 1 {
        return Err(Error::MultipleVaultRoots(roots.len()));
    }
    let root = roots.into_iter().next().unwrap_or_default();

    let vault = Vault::open(root)?;
    let compilation = compile(&vault, &files)?;

    for diagnostic in &compilation.diagnostics {
        eprintln!("{diagnostic}");
    }

    let errors = compilation.error_count();
    let warnings = compilation.warning_count();
    if errors > 0 {
        return Err(Error::CompilationFailed("errors".to_string()));
    }
    if strict && warnings > 0 {
        return Err(Error::CompilationFailed("warnings with --strict".to_string()));
    }

    let output_path = match out {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!(
            "spaced-bundle-{}.zip",
            Local::now().format("%Y%m%d-%H%M%S")
        )),
    };

    let file_count = files.len();
    let card_count = compilation.cards.len();
    let asset_count = compilation.asset_count();

    let archive = compilation.into_archive(Utc::now())?;
    fs::write(&output_path, archive)?;

    println!("Bundle created: {}", output_path.display());
    println!("Files scanned: {file_count}");
    println!("Cards parsed: {card_count}");
    println!("Assets packed: {asset_count}");
    println!("Warnings: {warnings}");

    Ok(())
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '[', ']', '{', '}'])
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Expands file paths and glob patterns into a sorted, deduplicated list
/// of absolute markdown file paths.
fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut expanded = BTreeSet::new();

    for input in inputs {
        if is_glob_pattern(input) {
            for entry in glob::glob(input)? {
                let path = entry.map_err(|err| Error::Io(err.into_error()))?;
                if path.is_file() && is_markdown(&path) {
                    expanded.insert(absolute(&path)?);
                }
            }
            continue;
        }

        let path = PathBuf::from(input);
        if path.is_dir() {
            return Err(Error::DirectoryInput(input.clone()));
        }
        if is_markdown(&path) {
            expanded.insert(absolute(&path)?);
        }
    }

    Ok(expanded.into_iter().collect())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path.canonicalize()?)
}

#[cfg(test)]
#[path = "compile_tests.rs"]
mod tests;
