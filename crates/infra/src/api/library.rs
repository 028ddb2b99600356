//! External library import and classification endpoints
//!
//! Implements the core [`LibraryGateway`] port on top of the resilient
//! client.

use async_trait::async_trait;
use lutem_common::error::ClassifiedError;
use lutem_core::LibraryGateway;
use lutem_domain::constants::USER_ID_HEADER;
use lutem_domain::{
    CatalogSnapshot, CatalogStats, ImportReport, IntegrationStatus, PendingItem, TaggingReport,
    TaggingRequest,
};
use serde::Serialize;
use tracing::instrument;

use crate::http::{RequestDescriptor, RequestOptions, ResilientClient};

type ApiResult<T> = Result<T, ClassifiedError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportBody<'a> {
    steam_id: &'a str,
}

#[derive(Clone)]
pub struct LibraryApi {
    client: ResilientClient,
    /// Forwarded as `X-Firebase-UID` on import and catalog calls
    user_id: Option<String>,
}

impl LibraryApi {
    pub fn new(client: ResilientClient) -> Self {
        Self { client, user_id: None }
    }

    /// Identify the caller to the library endpoints.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// `GET /api/steam/status`
    #[instrument(skip(self))]
    pub async fn status(&self) -> ApiResult<IntegrationStatus> {
        self.client.send(&RequestDescriptor::get("/api/steam/status")).await
    }

    /// `POST /api/steam/import`
    ///
    /// Without `account_ref` the server imports the account linked to the
    /// caller.
    #[instrument(skip(self))]
    pub async fn import_library(&self, account_ref: Option<&str>) -> ApiResult<ImportReport> {
        let mut request = self.identified(RequestDescriptor::post("/api/steam/import"));
        if let Some(steam_id) = account_ref {
            request = request.json(&ImportBody { steam_id });
        }
        self.client.send(&request).await
    }

    /// `GET /api/steam/library`
    #[instrument(skip(self))]
    pub async fn library(&self) -> ApiResult<CatalogSnapshot> {
        self.client.send(&self.identified(RequestDescriptor::get("/api/steam/library"))).await
    }

    /// `GET /admin/games/pending`
    #[instrument(skip(self))]
    pub async fn pending_games(&self) -> ApiResult<Vec<PendingItem>> {
        self.client.send(&RequestDescriptor::get("/admin/games/pending")).await
    }

    /// `GET /admin/games/stats`
    #[instrument(skip(self))]
    pub async fn game_stats(&self) -> ApiResult<CatalogStats> {
        self.client.send(&RequestDescriptor::get("/admin/games/stats")).await
    }

    /// `POST /admin/games/tag`, never retried.
    ///
    /// `None` asks the server to classify everything outstanding.
    #[instrument(skip(self, ids), fields(requested = ids.map(<[i64]>::len)))]
    pub async fn tag_games(&self, ids: Option<&[i64]>) -> ApiResult<TaggingReport> {
        self.tag(&TaggingRequest::new(ids)).await
    }

    async fn tag(&self, body: &TaggingRequest) -> ApiResult<TaggingReport> {
        let request = RequestDescriptor::post("/admin/games/tag").json(body);
        self.client.execute(&request, &RequestOptions::skip_retry()).await
    }

    fn identified(&self, request: RequestDescriptor) -> RequestDescriptor {
        match &self.user_id {
            Some(uid) => request.header(USER_ID_HEADER, uid.clone()),
            None => request,
        }
    }
}

#[async_trait]
impl LibraryGateway for LibraryApi {
    async fn integration_status(&self) -> ApiResult<IntegrationStatus> {
        self.status().await
    }

    async fn import_library(&self, account_ref: Option<&str>) -> ApiResult<ImportReport> {
        LibraryApi::import_library(self, account_ref).await
    }

    async fn fetch_catalog(&self) -> ApiResult<CatalogSnapshot> {
        self.library().await
    }

    async fn pending_items(&self) -> ApiResult<Vec<PendingItem>> {
        self.pending_games().await
    }

    async fn catalog_stats(&self) -> ApiResult<CatalogStats> {
        self.game_stats().await
    }

    async fn classify(&self, request: &TaggingRequest) -> ApiResult<TaggingReport> {
        self.tag(request).await
    }
}
