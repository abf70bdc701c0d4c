// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for collection management: `init`, `list`, `sync`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn spaced() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("spaced").unwrap()
}

fn spaced_in(data_dir: &Path) -> Command {
    let mut cmd = spaced();
    cmd.env("SPACED_DATA_DIR", data_dir);
    cmd.env_remove("SPACED_SERVER");
    cmd
}

#[test]
fn init_establishes_client_identity() {
    let data = TempDir::new().unwrap();

    spaced_in(data.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized collection"));

    // Metadata landed on disk.
    assert!(data.path().join("meta.json").exists());

    // A second init keeps the existing identity.
    spaced_in(data.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));
}

#[test]
fn list_empty_collection() {
    let data = TempDir::new().unwrap();

    spaced_in(data.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 cards"));

    spaced_in(data.path())
        .arg("list")
        .arg("--decks")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 decks"));
}

#[test]
fn list_json_is_valid_json() {
    let data = TempDir::new().unwrap();

    let output = spaced_in(data.path()).arg("list").arg("--json").output().unwrap();
    assert!(output.status.success());
    let cards: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(cards.as_array().unwrap().is_empty());
}

#[test]
fn sync_requires_a_server() {
    let data = TempDir::new().unwrap();

    spaced_in(data.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SPACED_SERVER"));
}

#[test]
fn sync_without_identity_reports_it() {
    let data = TempDir::new().unwrap();

    // A server URL is configured but init never ran; both directions
    // no-op on the missing identity without touching the network.
    spaced_in(data.path())
        .arg("sync")
        .arg("--server")
        .arg("http://localhost:9")
        .assert()
        .success()
        .stdout(predicate::str::contains("no client identity"));
}
