//! Shared test helpers for `lutem-core` integration tests.
//!
//! Provides a scripted `LibraryGateway` so pipeline tests can focus on state
//! transitions instead of transport details.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lutem_core::LibraryGateway;
use lutem_domain::{
    CatalogSnapshot, CatalogStats, ClassifiedError, ImportReport, IntegrationStatus, PendingItem,
    TaggingReport, TaggingRequest,
};
use serde_json::json;
use tokio::sync::Notify;

type Reply<T> = Result<T, ClassifiedError>;

/// Per-operation queue of replies; the last reply repeats once the queue
/// drains to a single entry.
struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
    calls: AtomicUsize,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self { replies: Mutex::new(VecDeque::new()), calls: AtomicUsize::new(0) }
    }
}

impl<T: Clone> Script<T> {
    fn push(&self, reply: Reply<T>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    fn next(&self, op: &str) -> Reply<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap_or_else(|| panic!("no scripted reply for {op}"))
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// In-memory `LibraryGateway` answering from scripted replies.
#[derive(Default)]
pub struct ScriptedGateway {
    status: Script<IntegrationStatus>,
    import: Script<ImportReport>,
    catalog: Script<CatalogSnapshot>,
    pending: Script<Vec<PendingItem>>,
    stats: Script<CatalogStats>,
    classify: Script<TaggingReport>,
    pub classify_requests: Mutex<Vec<TaggingRequest>>,
    /// When set, `classify` waits for a notification before answering
    pub classify_gate: Option<Arc<Notify>>,
    /// When set, `import_library` waits for a notification before answering
    pub import_gate: Option<Arc<Notify>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(self, reply: Reply<IntegrationStatus>) -> Self {
        self.status.push(reply);
        self
    }

    pub fn with_import(self, reply: Reply<ImportReport>) -> Self {
        self.import.push(reply);
        self
    }

    pub fn with_catalog(self, reply: Reply<CatalogSnapshot>) -> Self {
        self.catalog.push(reply);
        self
    }

    pub fn with_pending(self, reply: Reply<Vec<PendingItem>>) -> Self {
        self.pending.push(reply);
        self
    }

    pub fn with_stats(self, reply: Reply<CatalogStats>) -> Self {
        self.stats.push(reply);
        self
    }

    pub fn with_classify(self, reply: Reply<TaggingReport>) -> Self {
        self.classify.push(reply);
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.classify_gate = Some(gate);
        self
    }

    pub fn gated_import(mut self, gate: Arc<Notify>) -> Self {
        self.import_gate = Some(gate);
        self
    }

    pub fn import_calls(&self) -> usize {
        self.import.calls()
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog.calls()
    }

    pub fn stats_calls(&self) -> usize {
        self.stats.calls()
    }

    pub fn classify_calls(&self) -> usize {
        self.classify.calls()
    }
}

#[async_trait]
impl LibraryGateway for ScriptedGateway {
    async fn integration_status(&self) -> Reply<IntegrationStatus> {
        self.status.next("integration_status")
    }

    async fn import_library(&self, _account_ref: Option<&str>) -> Reply<ImportReport> {
        if let Some(gate) = &self.import_gate {
            gate.notified().await;
        }
        self.import.next("import_library")
    }

    async fn fetch_catalog(&self) -> Reply<CatalogSnapshot> {
        self.catalog.next("fetch_catalog")
    }

    async fn pending_items(&self) -> Reply<Vec<PendingItem>> {
        self.pending.next("pending_items")
    }

    async fn catalog_stats(&self) -> Reply<CatalogStats> {
        self.stats.next("catalog_stats")
    }

    async fn classify(&self, request: &TaggingRequest) -> Reply<TaggingReport> {
        self.classify_requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.classify_gate {
            gate.notified().await;
        }
        self.classify.next("classify")
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Catalog of `total` externally-sourced items whose first `classified` ids
/// are already classified.
pub fn catalog(total: i64, classified: i64) -> CatalogSnapshot {
    let games: Vec<_> = (1..=total)
        .map(|id| {
            json!({
                "libraryEntryId": 100 + id,
                "gameId": id,
                "gameName": format!("Game {id}"),
                "source": "STEAM",
                "addedAt": "2024-04-01T12:00:00",
                "isTagged": id <= classified
            })
        })
        .collect();
    serde_json::from_value(json!({
        "summary": {
            "totalGames": total,
            "steamGames": total,
            "taggedGames": classified,
            "untaggedGames": total - classified
        },
        "games": games
    }))
    .unwrap()
}

pub fn import_report(total: u32, matched: u32) -> ImportReport {
    serde_json::from_value(json!({
        "stats": {"total": total, "matched": matched, "unmatched": total - matched},
        "steamId": "76561198000000001",
        "message": "Import complete"
    }))
    .unwrap()
}

pub fn pending(ids: &[i64]) -> Vec<PendingItem> {
    ids.iter()
        .map(|id| PendingItem {
            id: *id,
            name: format!("Game {id}"),
            steam_app_id: None,
            tagging_source: None,
        })
        .collect()
}

pub fn stats(total: u32, pending: u32) -> CatalogStats {
    CatalogStats { total, pending, ai_configured: true, ..CatalogStats::default() }
}

pub fn tagging_report(succeeded: &[i64], failed: &[(i64, &str)]) -> TaggingReport {
    let tagged: Vec<_> = succeeded
        .iter()
        .map(|id| json!({"id": id, "name": format!("Game {id}"), "confidence": 0.8}))
        .collect();
    let failures: serde_json::Map<String, serde_json::Value> =
        failed.iter().map(|(id, reason)| (id.to_string(), json!(reason))).collect();
    let total = succeeded.len() + failed.len();

    serde_json::from_value(json!({
        "total": total,
        "successCount": succeeded.len(),
        "failedCount": failed.len(),
        "taggedGames": tagged,
        "failedGames": failures
    }))
    .unwrap()
}

pub fn server_error(status: u16, text: &str) -> ClassifiedError {
    ClassifiedError::new(status, text, None)
}
