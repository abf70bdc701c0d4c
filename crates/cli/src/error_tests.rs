// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn multiple_vault_roots_message() {
    let err = Error::MultipleVaultRoots(3);
    assert!(err.to_string().contains("3 roots"));
}

#[test]
fn no_server_message_has_hint() {
    assert!(Error::NoServer.to_string().contains("SPACED_SERVER"));
}

#[test]
fn core_and_compiler_errors_pass_through() {
    let err: Error = spaced_core::Error::CardNotFound("c1".into()).into();
    assert!(err.to_string().contains("c1"));

    let err: Error = spaced_compiler::Error::MissingManifest.into();
    assert!(err.to_string().contains("manifest.json"));
}
