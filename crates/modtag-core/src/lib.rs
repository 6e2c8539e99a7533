// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Modtag voting platform.
//!
//! This crate provides the domain records, the shared error type, the
//! [`CatalogStore`] trait the HTTP layer talks to, and the pure helpers that
//! derive vote statistics. Every other crate in the workspace depends on it.

pub mod api;
pub mod constants;
pub mod error;
pub mod stats;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ModtagError;
pub use stats::{calculate_percentage, group_by_category, vote_statistics};
pub use traits::CatalogStore;
pub use types::{HealthStatus, Module, TagCategory, TagSubcategory, TagVote, VoteSubmission};
