// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for the `spaced compile` command.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn spaced() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("spaced").unwrap()
}

/// A vault with one image and a two-card note referencing it.
fn two_card_vault() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join(".obsidian")).unwrap();
    fs::create_dir_all(temp.path().join("img")).unwrap();
    fs::create_dir_all(temp.path().join("notes")).unwrap();
    fs::write(temp.path().join("img/pic.png"), b"png bytes").unwrap();
    fs::write(
        temp.path().join("notes/deck.md"),
        "Q: What does the diagram show?\n![[pic.png]]\nA: A cell.\n===\nQ: Plain\nA: Card\n===\n",
    )
    .unwrap();
    temp
}

#[test]
fn compiles_two_card_fixture_with_one_image() {
    let vault = two_card_vault();
    let out = vault.path().join("deck.zip");

    spaced()
        .arg("compile")
        .arg(vault.path().join("notes/deck.md"))
        .arg("--out")
        .arg(&out)
        .current_dir(vault.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cards parsed: 2"))
        .stdout(predicate::str::contains("Assets packed: 1"))
        .stdout(predicate::str::contains("Warnings: 0"));

    let bundle = spaced_compiler::parse_bundle(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(bundle.manifest.cards.len(), 2);
    let with_image = &bundle.manifest.cards[0];
    assert!(!with_image.assets.is_empty());
    assert!(with_image.assets[0].placeholder.starts_with("asset://"));
}

#[test]
fn ambiguous_image_link_fails_with_code() {
    let vault = two_card_vault();
    fs::create_dir_all(vault.path().join("other")).unwrap();
    fs::write(vault.path().join("other/pic.png"), b"other bytes").unwrap();

    spaced()
        .arg("compile")
        .arg(vault.path().join("notes/deck.md"))
        .current_dir(vault.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("AMBIGUOUS_WIKI_LINK"))
        .stderr(predicate::str::contains("notes/deck.md:"));
}

#[test]
fn missing_delimiter_fails() {
    let vault = two_card_vault();
    fs::write(vault.path().join("notes/broken.md"), "Q: A\nA: B\n").unwrap();

    spaced()
        .arg("compile")
        .arg(vault.path().join("notes/broken.md"))
        .current_dir(vault.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("MISSING_DELIMITER"));
}

#[test]
fn warnings_only_fail_under_strict() {
    let vault = two_card_vault();
    fs::write(vault.path().join("notes/empty.md"), "no cards here\n").unwrap();
    let out = vault.path().join("empty.zip");

    spaced()
        .arg("compile")
        .arg(vault.path().join("notes/empty.md"))
        .arg("--out")
        .arg(&out)
        .current_dir(vault.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Warnings: 1"));

    spaced()
        .arg("compile")
        .arg(vault.path().join("notes/empty.md"))
        .arg("--strict")
        .current_dir(vault.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("NO_CARDS_FOUND"));
}

#[test]
fn glob_inputs_compile_all_matches() {
    let vault = two_card_vault();
    fs::write(vault.path().join("notes/more.md"), "Q: Extra\nA: Card\n===\n").unwrap();
    let out = vault.path().join("all.zip");

    let pattern = format!("{}/notes/*.md", vault.path().display());
    spaced()
        .arg("compile")
        .arg(&pattern)
        .arg("--out")
        .arg(&out)
        .current_dir(vault.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Files scanned: 2"))
        .stdout(predicate::str::contains("Cards parsed: 3"));
}

#[test]
fn no_matching_inputs_fails() {
    let vault = two_card_vault();

    spaced()
        .arg("compile")
        .arg(format!("{}/nothing/*.md", vault.path().display()))
        .current_dir(vault.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no markdown files"));
}
