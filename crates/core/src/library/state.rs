//! Observable library state
//!
//! [`LibraryStateStore`] owns the single [`LibraryState`] value and broadcasts
//! every change over a `tokio::sync::watch` channel. All mutation goes through
//! [`LibraryStateStore::update`] or [`LibraryStateStore::update_if`], each of
//! which applies one closure atomically, so readers never observe a
//! half-applied transition. The catalog snapshot is held behind an `Arc` and
//! only ever replaced whole.

use std::sync::Arc;

use lutem_domain::{
    BackgroundOutcome, CatalogSnapshot, CatalogStats, ClassificationLedger, ConnectionState,
    ImportReport, PendingItem,
};
use tokio::sync::watch;

/// Process-wide state of the library synchronization pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryState {
    /// Result of the last capability probe; `None` until probed
    pub configured: Option<bool>,
    pub connection: ConnectionState,
    pub account_ref: Option<String>,
    pub snapshot: Option<Arc<CatalogSnapshot>>,
    pub last_import: Option<ImportReport>,
    pub pending: BackgroundOutcome<Vec<PendingItem>>,
    pub stats: BackgroundOutcome<CatalogStats>,
    /// Ledger of the most recent classification batch
    pub ledger: Option<ClassificationLedger>,
    pub classifying: bool,
    /// True while at least one user-initiated operation is running
    pub loading: bool,
    /// Number of user-initiated operations currently running
    pub active_operations: u32,
    /// Bumped by every reset of the connection; operations started under an
    /// older epoch must not commit their results
    pub connection_epoch: u64,
    /// User-visible message of the last failed user-initiated operation
    pub error: Option<String>,
}

impl LibraryState {
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Classification needs a connected library with a fetched snapshot.
    pub fn can_classify(&self) -> bool {
        self.is_connected() && self.snapshot.is_some()
    }

    /// Install a freshly fetched snapshot together with the connection state
    /// it implies.
    pub(crate) fn replace_snapshot(&mut self, snapshot: Arc<CatalogSnapshot>) {
        self.connection = snapshot.connection_state();
        self.snapshot = Some(snapshot);
    }

    /// Mark the start of a user-initiated operation.
    pub(crate) fn begin_operation(&mut self) {
        self.active_operations += 1;
        self.loading = true;
        self.error = None;
    }

    /// Mark the end of a user-initiated operation.
    pub(crate) fn end_operation(&mut self) {
        self.active_operations = self.active_operations.saturating_sub(1);
        self.loading = self.active_operations > 0;
    }

    /// Drop everything tied to the current connection.
    pub(crate) fn reset_connection(&mut self) {
        self.connection_epoch = self.connection_epoch.wrapping_add(1);
        self.connection = if self.configured == Some(true) {
            ConnectionState::Disconnected
        } else {
            ConnectionState::Unconfigured
        };
        self.account_ref = None;
        self.snapshot = None;
        self.last_import = None;
        self.ledger = None;
        self.pending = BackgroundOutcome::Skipped;
        self.stats = BackgroundOutcome::Skipped;
        self.error = None;
    }
}

/// Single-writer container for [`LibraryState`] with change notification
#[derive(Debug)]
pub struct LibraryStateStore {
    tx: watch::Sender<LibraryState>,
}

impl Default for LibraryStateStore {
    fn default() -> Self {
        Self::new(LibraryState::default())
    }
}

impl LibraryStateStore {
    pub fn new(initial: LibraryState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> LibraryState {
        self.tx.borrow().clone()
    }

    /// Receiver notified after every applied update.
    pub fn subscribe(&self) -> watch::Receiver<LibraryState> {
        self.tx.subscribe()
    }

    /// Apply `f` atomically and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut LibraryState)) {
        self.tx.send_modify(f);
    }

    /// Apply `f` atomically; subscribers are notified only when it returns
    /// `true`.
    ///
    /// Used for check-and-set transitions: `f` must leave the state untouched
    /// when it returns `false`.
    pub fn update_if(&self, f: impl FnOnce(&mut LibraryState) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Read a projection of the current state without cloning all of it.
    pub fn read<R>(&self, f: impl FnOnce(&LibraryState) -> R) -> R {
        f(&self.tx.borrow())
    }
}
