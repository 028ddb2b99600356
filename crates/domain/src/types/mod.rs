//! Domain types and models

pub mod api;
pub mod ledger;
pub mod library;

pub use api::*;
pub use ledger::{ClassificationLedger, LedgerSuccess, TaggedGame, TaggingReport, TaggingRequest};
pub use library::{
    format_playtime, BackgroundOutcome, CatalogSnapshot, CatalogStats, CatalogSummary,
    ConnectionRecord, ConnectionState, ImportReport, ImportStats, IntegrationStatus, LibraryItem,
    LibrarySource, MatchedGame, PendingItem, TaggingSource, UnmatchedGame,
};
