//! Classification batch ledger
//!
//! The server answers a classification request with a [`TaggingReport`].
//! [`ClassificationLedger::from_report`] reconciles that report against what
//! was asked for so that every requested item ends up in exactly one of
//! `succeeded` or `failed`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::constants::NO_RESULT_REPORTED;

/// One successfully classified item as reported by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedGame {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub steam_app_id: Option<i64>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Raw classification response (`POST /admin/games/tag`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggingReport {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub success_count: u32,
    #[serde(default)]
    pub failed_count: u32,
    #[serde(default)]
    pub tagged_games: Vec<TaggedGame>,
    /// Item id to failure reason
    #[serde(default)]
    pub failed_games: BTreeMap<i64, String>,
}

/// Body of a classification request: explicit ids, or everything outstanding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TaggingRequest {
    Items {
        #[serde(rename = "gameIds")]
        game_ids: Vec<i64>,
    },
    All {
        all: bool,
    },
}

impl TaggingRequest {
    pub fn new(item_ids: Option<&[i64]>) -> Self {
        match item_ids {
            Some(ids) => Self::Items { game_ids: ids.to_vec() },
            None => Self::All { all: true },
        }
    }
}

/// A successfully classified item in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSuccess {
    pub item_id: i64,
    pub name: Option<String>,
    pub confidence: Option<f64>,
}

/// Per-run record of classification outcomes.
///
/// Invariant: `succeeded.len() + failed.len() == total_requested`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationLedger {
    pub total_requested: usize,
    pub succeeded: Vec<LedgerSuccess>,
    pub failed: BTreeMap<i64, String>,
    /// Set when the server refused to run the batch at all
    pub rejected: Option<String>,
}

impl ClassificationLedger {
    /// Reconcile a server report against the requested ids.
    ///
    /// With explicit ids, every distinct requested id is accounted for: ids
    /// the server did not mention fail with "no result reported" and ids it
    /// was not asked about are ignored. Without ids, the requested set is
    /// whatever the server reported. An id reported both ways counts as
    /// succeeded.
    pub fn from_report(requested: Option<&[i64]>, report: &TaggingReport) -> Self {
        let successes: BTreeMap<i64, &TaggedGame> =
            report.tagged_games.iter().map(|game| (game.id, game)).collect();

        let targets: Vec<i64> = match requested {
            Some(ids) => {
                let mut seen = BTreeSet::new();
                ids.iter().copied().filter(|id| seen.insert(*id)).collect()
            }
            None => {
                let mut seen = BTreeSet::new();
                report
                    .tagged_games
                    .iter()
                    .map(|game| game.id)
                    .chain(report.failed_games.keys().copied())
                    .filter(|id| seen.insert(*id))
                    .collect()
            }
        };

        let mut ledger = Self { total_requested: targets.len(), ..Self::default() };
        for id in targets {
            if let Some(game) = successes.get(&id) {
                ledger.succeeded.push(LedgerSuccess {
                    item_id: id,
                    name: Some(game.name.clone()),
                    confidence: game.confidence,
                });
            } else {
                let reason = report
                    .failed_games
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| NO_RESULT_REPORTED.to_string());
                ledger.failed.insert(id, reason);
            }
        }
        ledger
    }

    /// Empty ledger for a batch the server refused to start.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self { rejected: Some(reason.into()), ..Self::default() }
    }

    pub fn is_balanced(&self) -> bool {
        self.succeeded.len() + self.failed.len() == self.total_requested
    }

    pub fn is_rejected(&self) -> bool {
        self.rejected.is_some()
    }

    pub fn succeeded_ids(&self) -> Vec<i64> {
        self.succeeded.iter().map(|s| s.item_id).collect()
    }
}
