// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line voting client: `modules`, `vote`, `revote` and `history`.
//!
//! Talks to a running server at `client.base_url` and keeps the session id
//! and vote history in the JSON file at `client.local_store_path`.

use std::sync::Arc;
use std::time::Duration;

use modtag_client::{
    FileStore, HttpApiClient, LocalStore, ModulesStore, SessionManager, UserStore, VoteHistory,
    VotingApi, VotingStore,
};
use modtag_config::ModtagConfig;
use modtag_core::ModtagError;
use modtag_core::types::VoteScope;

struct ClientContext {
    api: Arc<HttpApiClient>,
    store: Arc<dyn LocalStore>,
}

impl ClientContext {
    fn new(config: &ModtagConfig) -> Result<Self, ModtagError> {
        Ok(Self {
            api: Arc::new(HttpApiClient::new(&config.client.base_url)?),
            store: Arc::new(FileStore::new(&config.client.local_store_path)),
        })
    }

    fn history(&self) -> VoteHistory {
        VoteHistory::new(self.store.clone())
    }

    fn voting(&self) -> VotingStore {
        VotingStore::new(
            self.api.clone(),
            SessionManager::new(self.store.clone()),
            self.history(),
        )
    }
}

pub async fn run_modules(
    config: &ModtagConfig,
    page: u32,
    search: Option<&str>,
) -> Result<(), ModtagError> {
    let ctx = ClientContext::new(config)?;
    let modules = Arc::new(ModulesStore::new(
        ctx.api.clone(),
        config.catalog.default_page_size,
    ));
    match search {
        // Searches take the same debounced path as typed input.
        Some(term) => {
            let input = modules.debounced_search(search_delay(config));
            input.input(term);
            input.finish().await?;
            if page > 1 {
                modules.fetch_modules(page, Some(term)).await?;
            }
        }
        None => modules.fetch_modules(page, None).await?,
    }

    let state = modules.state().get();
    if state.modules.is_empty() {
        println!("no modules found");
        return Ok(());
    }
    for module in &state.modules {
        let system = module.system.as_deref().unwrap_or("-");
        println!(
            "{}  {} by {} [{}] ({} votes)",
            module.id,
            module.name,
            module.author.join(", "),
            system,
            module.vote_count.unwrap_or(0)
        );
    }
    if let Some(pagination) = state.pagination {
        println!(
            "page {} of {} ({} modules)",
            pagination.page, pagination.total_pages, pagination.total
        );
    }
    Ok(())
}

pub async fn run_vote(
    config: &ModtagConfig,
    module_id: &str,
    subcategory_ids: Vec<String>,
) -> Result<(), ModtagError> {
    let ctx = ClientContext::new(config)?;
    let module = ctx.api.get_module(module_id).await?;
    let taxonomy = ctx.api.categories().await?;

    let voting = ctx.voting();
    voting.load_previous_vote(module_id).await?;
    let replacing = voting.state().get().has_voted;
    voting.set_selection(subcategory_ids);
    let record = voting
        .submit_vote(module_id, &module.module.name, &taxonomy)
        .await?;

    let verb = if replacing { "updated" } else { "recorded" };
    println!(
        "vote {verb} for {}: {}",
        record.module_name,
        record.subcategory_names.join(", ")
    );
    Ok(())
}

pub async fn run_revote(config: &ModtagConfig, module_id: &str) -> Result<(), ModtagError> {
    let ctx = ClientContext::new(config)?;
    let history = ctx.history();

    if history.has_voted(module_id)? {
        ctx.voting().revote(module_id).await?;
        println!("vote withdrawn for {module_id}");
        return Ok(());
    }

    // No local record: clear whatever the current session holds on the server.
    let Some(session_id) = SessionManager::new(ctx.store.clone()).current()? else {
        println!("no vote to withdraw for {module_id}");
        return Ok(());
    };
    let deleted = ctx
        .api
        .delete_votes(&VoteScope::new(module_id, session_id))
        .await?;
    println!(
        "removed {} server votes for {module_id}",
        deleted.deleted_count
    );
    Ok(())
}

pub fn run_history(config: &ModtagConfig, cleanup: bool) -> Result<(), ModtagError> {
    let store: Arc<dyn LocalStore> = Arc::new(FileStore::new(&config.client.local_store_path));
    let user = UserStore::new(VoteHistory::new(store));

    if cleanup {
        let removed = user.cleanup_old_data(config.client.history_retention_days)?;
        println!(
            "removed {removed} records older than {} days",
            config.client.history_retention_days
        );
    }

    user.load_vote_history()?;
    let state = user.state().get();
    if state.history.is_empty() {
        println!("no votes recorded on this device");
        return Ok(());
    }
    for record in &state.history {
        println!(
            "{}  {}: {} ({})",
            format_timestamp(record.timestamp),
            record.module_name,
            record.subcategory_names.join(", "),
            record.category_name
        );
    }
    println!(
        "{} votes across {} modules",
        state.stats.total_votes, state.stats.unique_modules
    );
    Ok(())
}

fn search_delay(config: &ModtagConfig) -> Duration {
    Duration::from_millis(config.client.search_debounce_ms)
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
