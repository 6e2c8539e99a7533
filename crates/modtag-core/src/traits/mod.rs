// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the storage seam.
//!
//! Uses `#[async_trait]` so backends can be held as `Arc<dyn CatalogStore>`.

pub mod store;

pub use store::CatalogStore;
