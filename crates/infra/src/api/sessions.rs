//! Per-user session statistics

use lutem_common::error::ClassifiedError;
use lutem_domain::{SatisfactionStats, WeeklySummary};
use tracing::instrument;

use crate::http::{RequestDescriptor, ResilientClient};

#[derive(Clone)]
pub struct SessionsApi {
    client: ResilientClient,
}

impl SessionsApi {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    /// `GET /api/users/{uid}/satisfaction-stats`
    #[instrument(skip(self))]
    pub async fn satisfaction_stats(&self, uid: &str) -> Result<SatisfactionStats, ClassifiedError> {
        let path = format!("/api/users/{}/satisfaction-stats", urlencoding::encode(uid));
        self.client.send(&RequestDescriptor::get(path)).await
    }

    /// `GET /api/users/{uid}/summary/weekly`
    #[instrument(skip(self))]
    pub async fn weekly_summary(&self, uid: &str) -> Result<WeeklySummary, ClassifiedError> {
        let path = format!("/api/users/{}/summary/weekly", urlencoding::encode(uid));
        self.client.send(&RequestDescriptor::get(path)).await
    }
}
