//! Port interfaces for library synchronization

use async_trait::async_trait;
use lutem_common::error::ClassifiedError;
use lutem_domain::{
    CatalogSnapshot, CatalogStats, ConnectionRecord, ImportReport, IntegrationStatus, PendingItem,
    Result, TaggingReport, TaggingRequest,
};

/// Remote operations the pipeline drives.
///
/// Implementations go through the resilient request client, so every error
/// is already classified.
#[async_trait]
pub trait LibraryGateway: Send + Sync {
    /// Whether the external library integration is configured server-side
    async fn integration_status(&self) -> std::result::Result<IntegrationStatus, ClassifiedError>;

    /// Import the external library.
    ///
    /// `None` lets the server use the account linked to the caller.
    async fn import_library(
        &self,
        account_ref: Option<&str>,
    ) -> std::result::Result<ImportReport, ClassifiedError>;

    /// Fetch the full catalog snapshot
    async fn fetch_catalog(&self) -> std::result::Result<CatalogSnapshot, ClassifiedError>;

    /// Catalog entries awaiting classification
    async fn pending_items(&self) -> std::result::Result<Vec<PendingItem>, ClassifiedError>;

    /// Classification statistics across the catalog
    async fn catalog_stats(&self) -> std::result::Result<CatalogStats, ClassifiedError>;

    /// Run a classification batch.
    ///
    /// Must not be retried by the transport: a batch is costly and not
    /// idempotent server-side.
    async fn classify(
        &self,
        request: &TaggingRequest,
    ) -> std::result::Result<TaggingReport, ClassifiedError>;
}

/// Durable storage for the connection record
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Load the persisted record, if any
    async fn load(&self) -> Result<Option<ConnectionRecord>>;

    /// Persist the record, replacing any previous one
    async fn save(&self, record: &ConnectionRecord) -> Result<()>;

    /// Remove the persisted record
    async fn clear(&self) -> Result<()>;
}
