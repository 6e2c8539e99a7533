// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Modtag integration tests.
//!
//! [`TestHarness`] runs a real gateway over a temp SQLite database on an
//! ephemeral port, so client and CLI tests exercise the full HTTP path
//! without external services.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder};
