//! End-to-end library synchronization
//!
//! Wires `LibraryApi`, `LibrarySyncPipeline` and `JsonFileConnectionStore`
//! together against a wiremock backend: probe, import, classify, restart
//! and disconnect.

use std::sync::Arc;
use std::time::Duration;

use lutem_common::resilience::{Jitter, RetryPolicy};
use lutem_core::{ConnectionStore, LibrarySyncPipeline};
use lutem_domain::{BackgroundOutcome, ConnectionRecord, ConnectionState, LutemError};
use lutem_infra::{JsonFileConnectionStore, LibraryApi, ResilientClient};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STEAM_ID: &str = "76561198000000001";

fn library_api(server: &MockServer) -> Arc<LibraryApi> {
    let client = ResilientClient::builder()
        .base_url(server.uri())
        .retry_policy(
            RetryPolicy::new(1, Duration::from_millis(5), Duration::from_millis(10))
                .expect("valid policy"),
        )
        .jitter(Jitter::None)
        .build()
        .expect("client should build");
    Arc::new(LibraryApi::new(client))
}

fn catalog_json(total: i64, classified: i64) -> Value {
    let games: Vec<_> = (1..=total)
        .map(|id| {
            json!({
                "libraryEntryId": 100 + id,
                "gameId": id,
                "gameName": format!("Game {id}"),
                "source": "STEAM",
                "steamAppId": 1000 + id,
                "playtimeForever": id * 30,
                "addedAt": "2024-04-01T12:00:00",
                "isTagged": id <= classified
            })
        })
        .collect();
    json!({
        "summary": {
            "totalGames": total,
            "steamGames": total,
            "taggedGames": classified,
            "untaggedGames": total - classified
        },
        "games": games
    })
}

async fn mount_json(server: &MockServer, verb: &str, route: &str, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_backend(server: &MockServer) {
    mount_json(server, "GET", "/api/steam/status", json!({"configured": true, "message": "ready"}))
        .await;
    Mock::given(method("POST"))
        .and(path("/api/steam/import"))
        .and(body_json(json!({"steamId": STEAM_ID})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stats": {"total": 10, "matched": 10, "unmatched": 0},
            "steamId": STEAM_ID,
            "message": "Imported 10 games"
        })))
        .mount(server)
        .await;

    // First catalog fetch sees three unclassified titles, later ones one.
    Mock::given(method("GET"))
        .and(path("/api/steam/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json(10, 7)))
        .up_to_n_times(1)
        .mount(server)
        .await;
    mount_json(server, "GET", "/api/steam/library", catalog_json(10, 9)).await;

    mount_json(
        server,
        "GET",
        "/admin/games/pending",
        json!([{"id": 8, "name": "Game 8"}, {"id": 9, "name": "Game 9"}, {"id": 10, "name": "Game 10"}]),
    )
    .await;
    mount_json(
        server,
        "GET",
        "/admin/games/stats",
        json!({"total": 10, "pending": 3, "aiGenerated": 7, "aiConfigured": true}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/admin/games/tag"))
        .and(body_json(json!({"all": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "successCount": 2,
            "failedCount": 1,
            "taggedGames": [
                {"id": 8, "name": "Game 8", "confidence": 0.9},
                {"id": 9, "name": "Game 9", "confidence": 0.7}
            ],
            "failedGames": {"10": "No store description"}
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn connect_classify_restart_disconnect() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let dir = TempDir::new().expect("temp dir");
    let state_path = dir.path().join("state").join("lutem.json");
    let store = Arc::new(JsonFileConnectionStore::new(&state_path, "library"));
    let pipeline = LibrarySyncPipeline::new(library_api(&server), store.clone());

    // Probe
    assert!(pipeline.check_capability().await);
    assert_eq!(pipeline.state().connection, ConnectionState::Disconnected);

    // Import
    let report = pipeline.connect(Some(STEAM_ID)).await.expect("connect");
    assert_eq!(report.stats.matched, 10);

    let state = pipeline.state();
    assert_eq!(state.connection, ConnectionState::Connected);
    assert_eq!(state.account_ref.as_deref(), Some(STEAM_ID));
    let snapshot = state.snapshot.as_ref().expect("snapshot installed");
    assert_eq!(snapshot.unclassified_ids(), vec![8, 9, 10]);
    assert_eq!(snapshot.item(1).map(|item| item.playtime_label()).as_deref(), Some("30m"));
    assert!(matches!(&state.pending, BackgroundOutcome::Ok(items) if items.len() == 3));
    assert!(matches!(&state.stats, BackgroundOutcome::Ok(stats) if stats.pending == 3));

    let persisted: Value =
        serde_json::from_str(&std::fs::read_to_string(&state_path).expect("state file written"))
            .expect("state file is JSON");
    assert_eq!(persisted["library"]["accountRef"], STEAM_ID);
    assert_eq!(persisted["library"]["connected"], true);

    // Classify everything outstanding
    let ledger = pipeline.classify_batch(None).await.expect("classify");
    assert_eq!(ledger.total_requested, 3);
    let succeeded: Vec<i64> = ledger.succeeded.iter().map(|s| s.item_id).collect();
    assert_eq!(succeeded, vec![8, 9]);
    assert_eq!(ledger.failed.get(&10).map(String::as_str), Some("No store description"));

    let state = pipeline.state();
    assert!(!state.classifying);
    assert_eq!(state.ledger.as_ref(), Some(&ledger));
    assert_eq!(state.snapshot.as_ref().map(|s| s.unclassified_ids()), Some(vec![10]));

    // Restart: a fresh pipeline over the same file restores the connection only
    let restarted_store = Arc::new(JsonFileConnectionStore::new(&state_path, "library"));
    let restarted = LibrarySyncPipeline::new(library_api(&server), restarted_store.clone());
    let record = restarted.hydrate().await.expect("hydrate");
    assert_eq!(
        record,
        Some(ConnectionRecord { account_ref: Some(STEAM_ID.to_string()), connected: true })
    );
    assert_eq!(restarted.state().connection, ConnectionState::Connected);
    assert!(restarted.state().snapshot.is_none());
    assert!(matches!(restarted.classify_batch(None).await, Err(LutemError::NotConnected)));

    // Disconnect
    restarted.disconnect().await;
    assert_eq!(restarted.state().connection, ConnectionState::Unconfigured);
    assert_eq!(restarted_store.load().await.expect("load"), None);
}

#[tokio::test]
async fn private_profile_leaves_nothing_behind() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/steam/import"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Steam profile is private"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("temp dir");
    let state_path = dir.path().join("lutem.json");
    let store = Arc::new(JsonFileConnectionStore::new(&state_path, "library"));
    let pipeline = LibrarySyncPipeline::new(library_api(&server), store.clone());

    let err = pipeline.connect(Some(STEAM_ID)).await.expect_err("import rejected");

    assert_eq!(err.user_message(), "Steam profile is private");
    let state = pipeline.state();
    assert_eq!(state.error.as_deref(), Some("Steam profile is private"));
    assert!(state.snapshot.is_none());
    assert!(!state.loading);
    assert!(!state_path.exists());
}

#[tokio::test]
async fn unconfigured_tagging_yields_rejected_ledger() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/steam/import"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stats": {"total": 2, "matched": 2, "unmatched": 0}
        })))
        .mount(&server)
        .await;
    mount_json(&server, "GET", "/api/steam/library", catalog_json(2, 0)).await;
    mount_json(&server, "GET", "/admin/games/pending", json!([])).await;
    mount_json(&server, "GET", "/admin/games/stats", json!({"total": 2, "pending": 2})).await;
    Mock::given(method("POST"))
        .and(path("/admin/games/tag"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"error": "AI tagging not configured"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(JsonFileConnectionStore::new(dir.path().join("lutem.json"), "library"));
    let pipeline = LibrarySyncPipeline::new(library_api(&server), store);

    pipeline.connect(None).await.expect("connect");
    let ledger = pipeline.classify_batch(Some(&[1, 2])).await.expect("rejection is not an error");

    assert_eq!(ledger.rejected.as_deref(), Some("AI tagging not configured"));
    assert_eq!(ledger.total_requested, 0);
    assert!(pipeline.state().error.is_none());
}
