// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP JSON API for the Modtag voting platform.
//!
//! Handlers are thin: they validate query and body input, call the
//! [`CatalogStore`](modtag_core::CatalogStore) held in [`GatewayState`], and
//! shape the response. Storage errors surface as `{"error": message}`.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{
    CatalogLimits, GatewayState, ServerConfig, bind, build_router, serve, start_server,
};
