// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for the `spaced import` command.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn spaced() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("spaced").unwrap()
}

fn spaced_in(data_dir: &Path) -> Command {
    let mut cmd = spaced();
    cmd.env("SPACED_DATA_DIR", data_dir);
    cmd
}

/// Compiles a two-card vault (one image) and returns (vault, bundle path).
fn compiled_bundle() -> (TempDir, std::path::PathBuf) {
    let vault = TempDir::new().unwrap();
    fs::create_dir_all(vault.path().join(".obsidian")).unwrap();
    fs::create_dir_all(vault.path().join("img")).unwrap();
    fs::create_dir_all(vault.path().join("notes")).unwrap();
    fs::write(vault.path().join("img/pic.png"), b"png bytes").unwrap();
    fs::write(
        vault.path().join("notes/deck.md"),
        "Q: What does the diagram show?\n![[pic.png]]\nA: A cell.\n===\nQ: Plain\nA: Card\n===\n",
    )
    .unwrap();

    let out = vault.path().join("deck.zip");
    spaced()
        .arg("compile")
        .arg(vault.path().join("notes/deck.md"))
        .arg("--out")
        .arg(&out)
        .current_dir(vault.path())
        .assert()
        .success();

    (vault, out)
}

#[test]
fn imports_bundle_into_collection() {
    let (_vault, bundle) = compiled_bundle();
    let data = TempDir::new().unwrap();

    spaced_in(data.path())
        .arg("import")
        .arg(&bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 cards"))
        .stdout(predicate::str::contains("Assets extracted: 1"));

    spaced_in(data.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 cards"))
        .stdout(predicate::str::contains("Plain"));

    // The asset landed in the media directory under its hashed name.
    let media = data.path().join("media");
    let extracted: Vec<_> = fs::read_dir(&media).unwrap().collect();
    assert_eq!(extracted.len(), 1);
}

#[test]
fn placeholders_are_replaced_with_media_paths() {
    let (_vault, bundle) = compiled_bundle();
    let data = TempDir::new().unwrap();

    spaced_in(data.path()).arg("import").arg(&bundle).assert().success();

    let listed = spaced_in(data.path()).arg("list").arg("--json").output().unwrap();
    let cards: serde_json::Value = serde_json::from_slice(&listed.stdout).unwrap();

    let fronts: Vec<String> = cards
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["front"].as_str().unwrap().to_string())
        .collect();
    let with_image = fronts.iter().find(|f| f.contains("diagram")).unwrap();

    assert!(!with_image.contains("asset://"), "placeholder left in: {with_image}");
    assert!(with_image.contains("media/"));
}

#[test]
fn skip_duplicates_skips_reimported_cards() {
    let (_vault, bundle) = compiled_bundle();
    let data = TempDir::new().unwrap();

    spaced_in(data.path()).arg("import").arg(&bundle).assert().success();

    spaced_in(data.path())
        .arg("import")
        .arg(&bundle)
        .arg("--skip-duplicates")
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 0 cards (2 duplicates skipped)"));

    spaced_in(data.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 cards"));
}

#[test]
fn reimport_without_flag_duplicates() {
    let (_vault, bundle) = compiled_bundle();
    let data = TempDir::new().unwrap();

    spaced_in(data.path()).arg("import").arg(&bundle).assert().success();
    spaced_in(data.path()).arg("import").arg(&bundle).assert().success();

    spaced_in(data.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 cards"));
}

#[test]
fn rejects_non_bundle_files() {
    let data = TempDir::new().unwrap();
    let bogus = data.path().join("not-a-bundle.zip");
    fs::write(&bogus, b"garbage").unwrap();

    spaced_in(data.path())
        .arg("import")
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid zip"));
}
