// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application-wide defaults.

/// Modules per page when the request does not say.
pub const MODULES_PER_PAGE: u32 = 20;

/// Shortest accepted query for the combined search endpoint, in characters.
pub const MIN_SEARCH_QUERY_LENGTH: usize = 2;

/// Quiet period before a typed search query is sent.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Local vote history older than this is dropped by cleanup.
pub const HISTORY_RETENTION_DAYS: u32 = 30;
