// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Spec-test workspace member.
//!
//! The CLI spec files under `cli/` are wired as `[[test]]` targets of the
//! `spaced` package so they run against its binary; this crate exists so
//! the workspace builds them in one place.
