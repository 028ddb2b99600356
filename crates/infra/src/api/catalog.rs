//! Game catalog endpoints

use lutem_common::error::ClassifiedError;
use lutem_domain::Game;
use tracing::instrument;

use crate::http::{RequestDescriptor, ResilientClient};

#[derive(Clone)]
pub struct CatalogApi {
    client: ResilientClient,
}

impl CatalogApi {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    /// `GET /games`
    #[instrument(skip(self))]
    pub async fn list_games(&self) -> Result<Vec<Game>, ClassifiedError> {
        self.client.send(&RequestDescriptor::get("/games")).await
    }

    /// `GET /games/{id}`
    #[instrument(skip(self))]
    pub async fn get_game(&self, id: i64) -> Result<Game, ClassifiedError> {
        self.client.send(&RequestDescriptor::get(format!("/games/{id}"))).await
    }
}
