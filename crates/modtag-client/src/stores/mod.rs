// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client view-model stores.

#[cfg(test)]
pub(crate) mod fake;
pub mod modules;
pub mod user;
pub mod voting;

pub use modules::{ModulesState, ModulesStore, SearchInput};
pub use user::{UserState, UserStore};
pub use voting::{VotingState, VotingStore};
