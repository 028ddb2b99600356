//! External library types
//!
//! Wire shapes of the library import endpoints plus the connection model the
//! synchronization pipeline works with. Field names follow the remote JSON
//! (`camelCase`).

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/* -------------------------------------------------------------------------- */
/* Connection */
/* -------------------------------------------------------------------------- */

/// Connection state of the external library integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// The integration is not configured on the server (or not yet probed)
    #[default]
    Unconfigured,
    /// Configured, but no library has been imported
    Disconnected,
    /// A library with at least one externally-sourced item is present
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "unconfigured"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// The durable part of the connection, persisted between runs.
///
/// The catalog snapshot and ledger are never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub account_ref: Option<String>,
    pub connected: bool,
}

/// Capability probe response (`GET /api/steam/status`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationStatus {
    pub configured: bool,
    #[serde(default)]
    pub message: String,
}

/* -------------------------------------------------------------------------- */
/* Catalog Snapshot */
/* -------------------------------------------------------------------------- */

/// Where a library entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LibrarySource {
    Steam,
    Manual,
    Epic,
    Gog,
    Xbox,
    Playstation,
}

/// How an item's classification was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaggingSource {
    Manual,
    AiGenerated,
    UserAdjusted,
    Pending,
}

/// Counts reported alongside the catalog items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    #[serde(rename = "totalGames")]
    pub total: u32,
    #[serde(rename = "steamGames")]
    pub externally_sourced: u32,
    #[serde(rename = "taggedGames")]
    pub classified: u32,
    #[serde(rename = "untaggedGames")]
    pub unclassified: u32,
}

/// One entry of the user's library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub library_entry_id: i64,
    /// Catalog identity; the id classification requests refer to
    pub game_id: i64,
    #[serde(rename = "gameName")]
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub source: LibrarySource,
    #[serde(default)]
    pub steam_app_id: Option<i64>,
    /// Minutes played in total
    #[serde(default)]
    pub playtime_forever: Option<u32>,
    /// Minutes played during the last two weeks
    #[serde(default, rename = "playtime2Weeks")]
    pub playtime_two_weeks: Option<u32>,
    pub added_at: NaiveDateTime,
    #[serde(rename = "isTagged")]
    pub classified: bool,
    #[serde(default)]
    pub tagging_source: Option<TaggingSource>,
}

impl LibraryItem {
    pub fn is_externally_sourced(&self) -> bool {
        self.source != LibrarySource::Manual
    }

    /// Total playtime formatted for display.
    pub fn playtime_label(&self) -> String {
        format_playtime(self.playtime_forever)
    }
}

/// Format a playtime in minutes as `"Never played"`, `"45m"`, `"2h"` or
/// `"2h 5m"`.
pub fn format_playtime(minutes: Option<u32>) -> String {
    match minutes {
        None | Some(0) => "Never played".to_string(),
        Some(m) if m < 60 => format!("{m}m"),
        Some(m) if m % 60 == 0 => format!("{}h", m / 60),
        Some(m) => format!("{}h {}m", m / 60, m % 60),
    }
}

/// The imported catalog (`GET /api/steam/library`).
///
/// Always replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub summary: CatalogSummary,
    #[serde(rename = "games", default)]
    pub items: Vec<LibraryItem>,
}

impl CatalogSnapshot {
    /// The only derivation of "connected": at least one externally-sourced
    /// item is present.
    pub fn is_connected(&self) -> bool {
        self.summary.externally_sourced >= 1
    }

    /// Connection state implied by this snapshot.
    pub fn connection_state(&self) -> ConnectionState {
        if self.is_connected() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Ids of items still awaiting classification, in catalog order.
    pub fn unclassified_ids(&self) -> Vec<i64> {
        self.items.iter().filter(|item| !item.classified).map(|item| item.game_id).collect()
    }

    pub fn item(&self, game_id: i64) -> Option<&LibraryItem> {
        self.items.iter().find(|item| item.game_id == game_id)
    }
}

/* -------------------------------------------------------------------------- */
/* Import */
/* -------------------------------------------------------------------------- */

/// An imported title that matched an existing catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedGame {
    pub steam_app_id: i64,
    pub name: String,
    pub lutem_game_id: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub playtime_forever: Option<u32>,
    #[serde(default, rename = "playtime2Weeks")]
    pub playtime_two_weeks: Option<u32>,
}

/// An imported title with no catalog entry yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedGame {
    pub steam_app_id: i64,
    pub name: String,
    #[serde(default)]
    pub playtime_forever: Option<u32>,
    #[serde(default, rename = "playtime2Weeks")]
    pub playtime_two_weeks: Option<u32>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub total: u32,
    pub matched: u32,
    pub unmatched: u32,
    #[serde(default)]
    pub already_in_library: u32,
}

/// Result of importing an external library (`POST /api/steam/import`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    #[serde(default)]
    pub matched: Vec<MatchedGame>,
    #[serde(default)]
    pub unmatched: Vec<UnmatchedGame>,
    pub stats: ImportStats,
    #[serde(rename = "steamId", default)]
    pub account_ref: Option<String>,
    #[serde(default)]
    pub message: String,
}

/* -------------------------------------------------------------------------- */
/* Classification Backlog */
/* -------------------------------------------------------------------------- */

/// A catalog entry awaiting classification (`GET /admin/games/pending`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub steam_app_id: Option<i64>,
    #[serde(default)]
    pub tagging_source: Option<TaggingSource>,
}

/// Classification statistics (`GET /admin/games/stats`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogStats {
    pub total: u32,
    pub pending: u32,
    pub manual: u32,
    pub ai_generated: u32,
    pub user_adjusted: u32,
    pub fully_tagged: u32,
    pub ai_configured: bool,
}

/* -------------------------------------------------------------------------- */
/* Background Outcome */
/* -------------------------------------------------------------------------- */

/// Result of a best-effort background operation.
///
/// Failures are recorded instead of propagated so callers (and tests) can
/// see that something was swallowed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BackgroundOutcome<T> {
    Ok(T),
    /// The precondition for running was not met
    #[default]
    Skipped,
    /// The operation ran and failed; carries the reason
    Failed(String),
}

impl<T> BackgroundOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn ok(&self) -> Option<&T> {
        match self {
            Self::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> BackgroundOutcome<U> {
        match self {
            Self::Ok(value) => BackgroundOutcome::Ok(f(value)),
            Self::Skipped => BackgroundOutcome::Skipped,
            Self::Failed(reason) => BackgroundOutcome::Failed(reason),
        }
    }

    /// Borrowing variant of [`BackgroundOutcome::map`].
    pub fn map_ref<U>(&self, f: impl FnOnce(&T) -> U) -> BackgroundOutcome<U> {
        match self {
            Self::Ok(value) => BackgroundOutcome::Ok(f(value)),
            Self::Skipped => BackgroundOutcome::Skipped,
            Self::Failed(reason) => BackgroundOutcome::Failed(reason.clone()),
        }
    }
}
