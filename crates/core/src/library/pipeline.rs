//! Library synchronization pipeline - core business logic
//!
//! Drives the connect → import → classify → reconcile workflow for a user's
//! externally hosted game library. User-initiated operations propagate their
//! errors (and record a user-visible message in state); background refreshes
//! record a [`BackgroundOutcome`] instead.
//!
//! Every operation captures the connection epoch when it starts. Results that
//! arrive after a [`LibrarySyncPipeline::disconnect`] belong to a connection
//! that no longer exists and are discarded, both in state and in the store.

use std::sync::Arc;

use lutem_common::error::{ClassifiedError, ErrorClassification};
use lutem_domain::constants::CLASSIFICATION_PRECONDITION_STATUSES;
use lutem_domain::{
    BackgroundOutcome, CatalogSnapshot, ClassificationLedger, ConnectionRecord, ConnectionState,
    ImportReport, LutemError, Result, TaggingRequest,
};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use super::ports::{ConnectionStore, LibraryGateway};
use super::state::{LibraryState, LibraryStateStore};

/// Library synchronization pipeline
pub struct LibrarySyncPipeline {
    gateway: Arc<dyn LibraryGateway>,
    store: Arc<dyn ConnectionStore>,
    state: LibraryStateStore,
    /// Serializes writes to `store` against the epoch check that guards them
    persist_lock: Mutex<()>,
}

impl LibrarySyncPipeline {
    /// Create a new pipeline with empty state
    pub fn new(gateway: Arc<dyn LibraryGateway>, store: Arc<dyn ConnectionStore>) -> Self {
        Self { gateway, store, state: LibraryStateStore::default(), persist_lock: Mutex::new(()) }
    }

    /// Current state.
    pub fn state(&self) -> LibraryState {
        self.state.snapshot()
    }

    /// Receiver notified after every state transition.
    pub fn subscribe(&self) -> watch::Receiver<LibraryState> {
        self.state.subscribe()
    }

    /// Seed state from the persisted connection record.
    ///
    /// Only meaningful at startup, before the first snapshot is fetched; a
    /// snapshot is never restored and must be refetched.
    ///
    /// # Errors
    /// Returns `LutemError::Storage` if the record cannot be read.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> Result<Option<ConnectionRecord>> {
        let record = self.store.load().await?;
        if let Some(record) = &record {
            debug!(connected = record.connected, "Restoring persisted connection");
            self.state.update(|state| {
                if state.snapshot.is_none() {
                    state.account_ref.clone_from(&record.account_ref);
                    if record.connected {
                        state.connection = ConnectionState::Connected;
                    }
                }
            });
        }
        Ok(record)
    }

    /// Probe whether the integration is configured at all.
    ///
    /// Never fails: a failed probe is logged and reported as "not
    /// configured".
    #[instrument(skip(self))]
    pub async fn check_capability(&self) -> bool {
        match self.gateway.integration_status().await {
            Ok(status) => {
                debug!(configured = status.configured, message = %status.message, "Capability probed");
                self.state.update(|state| {
                    state.configured = Some(status.configured);
                    if !status.configured {
                        state.connection = ConnectionState::Unconfigured;
                    } else if state.connection == ConnectionState::Unconfigured {
                        state.connection = ConnectionState::Disconnected;
                    }
                });
                status.configured
            }
            Err(err) => {
                warn!(error = %err, "Capability probe failed, treating integration as unconfigured");
                self.state.update(|state| state.configured = Some(false));
                false
            }
        }
    }

    /// Import the external library and install the resulting catalog.
    ///
    /// State is committed only when both the import and the catalog fetch
    /// succeed; on failure the previous snapshot and connection are kept.
    /// Statistics and the pending backlog are refreshed afterwards on a
    /// best-effort basis. When the library is disconnected while the import
    /// runs, the report is returned but nothing is installed.
    ///
    /// # Errors
    /// Returns `LutemError::Api` with the import or catalog failure.
    #[instrument(skip(self))]
    pub async fn connect(&self, account_ref: Option<&str>) -> Result<ImportReport> {
        let operation = self.begin_user_operation();
        let epoch = operation.epoch;

        let fetched = async {
            let report = self.gateway.import_library(account_ref).await?;
            let snapshot = self.gateway.fetch_catalog().await?;
            Ok::<_, ClassifiedError>((report, snapshot))
        }
        .await;

        let (report, snapshot) = match fetched {
            Ok(pair) => pair,
            Err(err) => return Err(self.fail_user_operation(epoch, err.into())),
        };

        let account = account_ref.map(str::to_owned).or_else(|| report.account_ref.clone());
        let snapshot = Arc::new(snapshot);
        info!(
            imported = report.stats.total,
            matched = report.stats.matched,
            unmatched = report.stats.unmatched,
            externally_sourced = snapshot.summary.externally_sourced,
            "Library imported"
        );

        let connection = snapshot.connection_state();
        let installed = self.state.update_if(|state| {
            if state.connection_epoch != epoch {
                return false;
            }
            state.configured = Some(true);
            state.last_import = Some(report.clone());
            state.account_ref.clone_from(&account);
            state.replace_snapshot(snapshot);
            true
        });
        if !installed {
            info!("Library disconnected during import, discarding result");
            return Ok(report);
        }
        self.persist(epoch, account, connection).await;

        self.refresh_stats().await;
        self.fetch_unclassified_items().await;

        Ok(report)
    }

    /// Refetch the catalog and replace the snapshot wholesale.
    ///
    /// # Errors
    /// Returns `LutemError::Api`; the previous snapshot is kept.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self) -> Result<Arc<CatalogSnapshot>> {
        let operation = self.begin_user_operation();
        self.reload_catalog(operation.epoch)
            .await
            .map_err(|err| self.fail_user_operation(operation.epoch, err))
    }

    /// Refresh the classification backlog.
    ///
    /// Returns the number of pending items; failures are logged and recorded,
    /// never propagated.
    #[instrument(skip(self))]
    pub async fn fetch_unclassified_items(&self) -> BackgroundOutcome<usize> {
        let Some(epoch) = self.connected_epoch() else {
            return BackgroundOutcome::Skipped;
        };

        let outcome = match self.gateway.pending_items().await {
            Ok(items) => BackgroundOutcome::Ok(items),
            Err(err) => {
                warn!(error = %err, "Failed to fetch unclassified items");
                BackgroundOutcome::Failed(err.to_string())
            }
        };
        let summary = outcome.map_ref(Vec::len);
        if !self.commit(epoch, |state| state.pending = outcome) {
            return BackgroundOutcome::Skipped;
        }
        summary
    }

    /// Refresh catalog classification statistics. Best-effort, like
    /// [`Self::fetch_unclassified_items`].
    #[instrument(skip(self))]
    pub async fn refresh_stats(&self) -> BackgroundOutcome<()> {
        let Some(epoch) = self.connected_epoch() else {
            return BackgroundOutcome::Skipped;
        };

        let outcome = match self.gateway.catalog_stats().await {
            Ok(stats) => BackgroundOutcome::Ok(stats),
            Err(err) => {
                warn!(error = %err, "Failed to refresh catalog statistics");
                BackgroundOutcome::Failed(err.to_string())
            }
        };
        let summary = outcome.map_ref(|_| ());
        if !self.commit(epoch, |state| state.stats = outcome) {
            return BackgroundOutcome::Skipped;
        }
        summary
    }

    /// Run a classification batch and reconcile the result into a ledger.
    ///
    /// `None` classifies everything outstanding. Only one batch may run at a
    /// time. Whatever the outcome, the catalog and statistics are refreshed
    /// afterwards, unless the library was disconnected in the meantime, in
    /// which case the ledger is returned but not stored.
    ///
    /// # Errors
    /// - `LutemError::NotConnected` without a connected snapshot (no remote
    ///   call is made)
    /// - `LutemError::ClassificationInFlight` while another batch runs
    /// - `LutemError::Api` for failures other than a precondition rejection,
    ///   which instead yields an empty ledger
    #[instrument(skip(self, item_ids), fields(requested = item_ids.map(<[i64]>::len)))]
    pub async fn classify_batch(&self, item_ids: Option<&[i64]>) -> Result<ClassificationLedger> {
        let mut gate = Err(LutemError::NotConnected);
        self.state.update_if(|state| {
            if !state.can_classify() {
                return false;
            }
            if state.classifying {
                gate = Err(LutemError::ClassificationInFlight);
                return false;
            }
            state.classifying = true;
            state.ledger = None;
            state.error = None;
            gate = Ok(state.connection_epoch);
            true
        });
        let epoch = gate?;
        let _classifying = ClassifyingGuard(&self.state);

        let request = TaggingRequest::new(item_ids);
        let outcome = match self.gateway.classify(&request).await {
            Ok(report) => Ok(ClassificationLedger::from_report(item_ids, &report)),
            Err(err) if CLASSIFICATION_PRECONDITION_STATUSES.contains(&err.status_code()) => {
                let reason = LutemError::from(err).user_message();
                warn!(reason = %reason, "Classification rejected by server");
                Ok(ClassificationLedger::rejected(reason))
            }
            Err(err) => Err(LutemError::from(err)),
        };

        let committed = match &outcome {
            Ok(ledger) => {
                info!(
                    total = ledger.total_requested,
                    succeeded = ledger.succeeded.len(),
                    failed = ledger.failed.len(),
                    rejected = ledger.is_rejected(),
                    "Classification batch finished"
                );
                let ledger = ledger.clone();
                self.commit(epoch, |state| state.ledger = Some(ledger))
            }
            Err(err) => {
                warn!(error = %err, severity = %err.severity(), "Classification batch failed");
                let message = err.user_message();
                self.commit(epoch, |state| state.error = Some(message))
            }
        };
        if !committed {
            info!("Library disconnected during classification, discarding result");
            return outcome;
        }

        if let Err(err) = self.reload_catalog(epoch).await {
            warn!(error = %err, "Catalog refresh after classification failed");
        }
        self.refresh_stats().await;
        self.fetch_unclassified_items().await;

        outcome
    }

    /// Forget the ledger of the last batch.
    pub fn dismiss_ledger(&self) {
        self.state.update(|state| state.ledger = None);
    }

    pub fn clear_error(&self) {
        self.state.update(|state| state.error = None);
    }

    /// Drop the connection locally.
    ///
    /// Clears connection, snapshot, ledger and the persisted record. The
    /// remote side is not contacted. Operations still in flight finish
    /// without committing anything.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) {
        self.state.update(LibraryState::reset_connection);
        let _persisting = self.persist_lock.lock().await;
        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "Failed to clear persisted connection record");
        }
        info!("Library disconnected");
    }

    async fn reload_catalog(&self, epoch: u64) -> Result<Arc<CatalogSnapshot>> {
        let snapshot = Arc::new(self.gateway.fetch_catalog().await?);
        let connection = snapshot.connection_state();
        let installed = Arc::clone(&snapshot);
        let mut account = None;
        let replaced = self.commit(epoch, |state| {
            state.replace_snapshot(installed);
            account.clone_from(&state.account_ref);
        });
        if replaced {
            debug!(items = snapshot.items.len(), connection = %connection, "Catalog snapshot replaced");
            self.persist(epoch, account, connection).await;
        } else {
            debug!("Library disconnected during catalog fetch, snapshot discarded");
        }
        Ok(snapshot)
    }

    /// Save the connection record unless the connection was reset since
    /// `epoch`. The check and the write happen under `persist_lock`, the
    /// same lock `disconnect` clears the store under.
    async fn persist(&self, epoch: u64, account_ref: Option<String>, connection: ConnectionState) {
        let _persisting = self.persist_lock.lock().await;
        if self.state.read(|state| state.connection_epoch) != epoch {
            return;
        }
        let record = ConnectionRecord { account_ref, connected: connection.is_connected() };
        if let Err(err) = self.store.save(&record).await {
            warn!(error = %err, "Failed to persist connection record");
        }
    }

    /// Apply `f` only if the connection has not been reset since `epoch`.
    fn commit(&self, epoch: u64, f: impl FnOnce(&mut LibraryState)) -> bool {
        self.state.update_if(|state| {
            if state.connection_epoch != epoch {
                return false;
            }
            f(state);
            true
        })
    }

    /// Epoch of the current connection, or `None` when not connected.
    fn connected_epoch(&self) -> Option<u64> {
        self.state.read(|state| state.is_connected().then_some(state.connection_epoch))
    }

    fn begin_user_operation(&self) -> UserOperation<'_> {
        let mut epoch = 0;
        self.state.update(|state| {
            state.begin_operation();
            epoch = state.connection_epoch;
        });
        UserOperation { state: &self.state, epoch }
    }

    fn fail_user_operation(&self, epoch: u64, err: LutemError) -> LutemError {
        warn!(error = %err, "Library operation failed");
        let message = err.user_message();
        self.commit(epoch, |state| state.error = Some(message));
        err
    }
}

/// A running user-initiated operation; ends it when dropped, so `loading`
/// stays accurate even when the caller abandons the future.
struct UserOperation<'a> {
    state: &'a LibraryStateStore,
    epoch: u64,
}

impl Drop for UserOperation<'_> {
    fn drop(&mut self) {
        self.state.update(LibraryState::end_operation);
    }
}

/// Clears the `classifying` flag however the batch ends, including when the
/// caller drops the future.
struct ClassifyingGuard<'a>(&'a LibraryStateStore);

impl Drop for ClassifyingGuard<'_> {
    fn drop(&mut self) {
        self.0.update(|state| state.classifying = false);
    }
}
