// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client stores driven against a live server.

use std::sync::Arc;

use modtag_client::{
    FileStore, HttpApiClient, LocalStore, MemoryStore, ModulesStore, SessionManager, UserStore,
    VoteHistory, VotingApi, VotingStore,
};
use modtag_core::ModtagError;
use modtag_core::types::{AuthorField, NewModule, SearchKind, VoteScope, VoteSubmission};
use modtag_test_utils::TestHarness;

struct Client {
    api: Arc<HttpApiClient>,
    store: Arc<dyn LocalStore>,
}

impl Client {
    fn new(harness: &TestHarness) -> Self {
        Self::with_store(harness, Arc::new(MemoryStore::new()))
    }

    fn with_store(harness: &TestHarness, store: Arc<dyn LocalStore>) -> Self {
        Self {
            api: Arc::new(HttpApiClient::new(&harness.base_url()).unwrap()),
            store,
        }
    }

    fn voting(&self) -> VotingStore {
        VotingStore::new(
            self.api.clone(),
            SessionManager::new(self.store.clone()),
            VoteHistory::new(self.store.clone()),
        )
    }

    fn history(&self) -> VoteHistory {
        VoteHistory::new(self.store.clone())
    }
}

#[tokio::test]
async fn vote_then_revise_then_withdraw() {
    let harness = TestHarness::builder()
        .with_module("Tomb of Horrors", "Gary Gygax")
        .build()
        .await
        .unwrap();
    let module = harness.modules()[0].clone();
    let client = Client::new(&harness);
    let taxonomy = client.api.categories().await.unwrap();
    let voting = client.voting();

    voting.toggle_subcategory("sub-1");
    voting.toggle_subcategory("sub-2");
    let record = voting
        .submit_vote(&module.id, &module.name, &taxonomy)
        .await
        .unwrap();
    assert_eq!(record.subcategory_names, vec!["Gore", "Combat"]);
    assert_eq!(record.category_name, "Violence");

    let counts = client.api.vote_counts(&module.id).await.unwrap();
    assert_eq!(counts.len(), 2);
    assert!(counts.iter().all(|c| c.count == 1));

    // Second submission replaces the first under the same session.
    voting.set_selection(vec!["sub-3".to_string()]);
    let revised = voting
        .submit_vote(&module.id, &module.name, &taxonomy)
        .await
        .unwrap();
    assert_eq!(revised.session_id, record.session_id);
    let counts = client.api.vote_counts(&module.id).await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].subcategory_id, "sub-3");
    assert_eq!(counts[0].tag_subcategories.tag_categories.name, "Tone");

    voting.revote(&module.id).await.unwrap();
    assert!(client.api.vote_counts(&module.id).await.unwrap().is_empty());
    assert!(!client.history().has_voted(&module.id).unwrap());
    assert_eq!(voting.state().get().selected, vec!["sub-3"]);

    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn two_clients_count_separately() {
    let harness = TestHarness::builder()
        .with_module("Death Frost Doom", "Zak Smith")
        .build()
        .await
        .unwrap();
    let module = harness.modules()[0].clone();
    let taxonomy = Client::new(&harness).api.categories().await.unwrap();

    for subs in [vec!["sub-1", "sub-2"], vec!["sub-2"]] {
        let client = Client::new(&harness);
        let voting = client.voting();
        voting.set_selection(subs.into_iter().map(String::from).collect());
        voting
            .submit_vote(&module.id, &module.name, &taxonomy)
            .await
            .unwrap();
    }

    let detail = Client::new(&harness).api.get_module(&module.id).await.unwrap();
    assert_eq!(detail.total_votes, 3);
    let combat = detail
        .vote_statistics
        .iter()
        .find(|s| s.subcategory_id == "sub-2")
        .unwrap();
    assert_eq!(combat.vote_count, 2);
    assert_eq!(combat.percentage, 67);
}

#[tokio::test]
async fn reconciliation_prefers_server_rows() {
    let harness = TestHarness::builder()
        .with_module("Masks of Nyarlathotep", "Larry DiTillio")
        .build()
        .await
        .unwrap();
    let module = harness.modules()[0].clone();
    let client = Client::new(&harness);
    let taxonomy = client.api.categories().await.unwrap();
    let voting = client.voting();

    voting.set_selection(vec!["sub-1".to_string()]);
    let record = voting
        .submit_vote(&module.id, &module.name, &taxonomy)
        .await
        .unwrap();

    // Another device with the same session changed the server selection.
    client
        .api
        .replace_votes(&VoteSubmission::new(
            &module.id,
            vec!["sub-2".to_string(), "sub-3".to_string()],
            record.session_id.clone(),
        ))
        .await
        .unwrap();

    let fresh = client.voting();
    fresh.load_previous_vote(&module.id).await.unwrap();
    let state = fresh.state().get();
    assert!(state.has_voted);
    let mut selected = state.selected.clone();
    selected.sort();
    assert_eq!(selected, vec!["sub-2", "sub-3"]);
}

#[tokio::test]
async fn duplicate_post_inserts_nothing() {
    let harness = TestHarness::builder()
        .with_module("The Gardens of Ynn", "Emmy Allen")
        .build()
        .await
        .unwrap();
    let module = harness.modules()[0].clone();
    let api = Client::new(&harness).api;
    let submission = VoteSubmission::new(&module.id, vec!["sub-1".to_string()], "session-a");

    let first = api.submit_votes(&submission).await.unwrap();
    assert_eq!(first.votes.len(), 1);
    let second = api.submit_votes(&submission).await.unwrap();
    assert!(second.votes.is_empty());
    assert_eq!(second.message, "no new votes to submit");

    let mine = api
        .user_votes(&VoteScope::new(&module.id, "session-a"))
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
}

#[tokio::test]
async fn server_errors_surface_as_api_errors() {
    let harness = TestHarness::builder().build().await.unwrap();
    let api = Client::new(&harness).api;

    let missing = api.get_module("no-such-module").await.unwrap_err();
    assert!(matches!(missing, ModtagError::Api { status: 404, .. }));

    let invalid = api
        .create_module(&NewModule {
            name: Some("Nameless".to_string()),
            ..NewModule::default()
        })
        .await
        .unwrap_err();
    match invalid {
        ModtagError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "module name and author are required");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let short = api.search("d", SearchKind::All, None).await.unwrap_err();
    assert!(matches!(short, ModtagError::Api { status: 400, .. }));
}

#[tokio::test]
async fn browse_and_search_modules() {
    let harness = TestHarness::builder()
        .with_module("Deep Carbon Observatory", "Patrick Stuart")
        .with_module("Dolmenwood", "Gavin Norman")
        .with_module("Hot Springs Island", "Jacob Hurst")
        .build()
        .await
        .unwrap();
    let client = Client::new(&harness);

    let created = client
        .api
        .create_module(&NewModule {
            name: Some("Dragon Heist".to_string()),
            author: Some(AuthorField::Many(vec![
                "Chris Perkins".to_string(),
                "Adam Lee".to_string(),
            ])),
            system: Some("D&D 5e".to_string()),
            ..NewModule::default()
        })
        .await
        .unwrap();
    assert_eq!(created.author.len(), 2);

    let modules = ModulesStore::new(client.api.clone(), 2);
    modules.fetch_modules(1, None).await.unwrap();
    let state = modules.state().get();
    assert_eq!(state.modules.len(), 2);
    assert_eq!(state.modules[0].name, "Dragon Heist");
    let pagination = state.pagination.unwrap();
    assert_eq!(pagination.total, 4);
    assert_eq!(pagination.total_pages, 2);

    modules.go_to_page(2).await.unwrap();
    assert_eq!(modules.state().get().current_page, 2);

    modules.search_modules("d").await.unwrap();
    let names: Vec<String> = modules
        .state()
        .get()
        .modules
        .iter()
        .map(|m| m.name.clone())
        .collect();
    assert!(names.contains(&"Dolmenwood".to_string()));

    let found = client
        .api
        .search("gore", SearchKind::Tags, Some(5))
        .await
        .unwrap();
    assert!(found.results.modules.is_none());
    assert_eq!(found.total.subcategories, 1);
}

#[tokio::test]
async fn file_backed_history_survives_restart() {
    let harness = TestHarness::builder()
        .with_module("Castle Xyntillan", "Gabor Lux")
        .build()
        .await
        .unwrap();
    let module = harness.modules()[0].clone();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.json");

    let first = Client::with_store(&harness, Arc::new(FileStore::new(&path)));
    let taxonomy = first.api.categories().await.unwrap();
    let voting = first.voting();
    voting.set_selection(vec!["sub-3".to_string()]);
    let record = voting
        .submit_vote(&module.id, &module.name, &taxonomy)
        .await
        .unwrap();

    let reopened = Client::with_store(&harness, Arc::new(FileStore::new(&path)));
    let session = SessionManager::new(reopened.store.clone());
    assert_eq!(session.current().unwrap(), Some(record.session_id.clone()));

    let user = UserStore::new(reopened.history());
    user.load_vote_history().unwrap();
    let state = user.state().get();
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].module_name, "Castle Xyntillan");
    assert_eq!(state.stats.total_votes, 1);
}
