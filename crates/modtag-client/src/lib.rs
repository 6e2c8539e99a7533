// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the Modtag voting API.
//!
//! Holds the anonymous session and the local vote history, talks to the
//! server through [`VotingApi`], and exposes observable stores for module
//! browsing, voting, and history views.

pub mod api;
pub mod debounce;
pub mod history;
pub mod local_store;
pub mod results;
pub mod session;
pub mod state;
pub mod stores;

pub use api::{HttpApiClient, VotingApi};
pub use debounce::Debouncer;
pub use history::{HistoryStats, LocalVoteRecord, VoteHistory};
pub use local_store::{FileStore, LocalStore, MemoryStore};
pub use results::{ResultsSummary, ResultsView};
pub use session::SessionManager;
pub use state::StateCell;
pub use stores::{ModulesStore, SearchInput, UserStore, VotingStore};
