//! Recommendation endpoint

use lutem_common::error::ClassifiedError;
use lutem_domain::{RecommendationRequest, RecommendationResponse};
use tracing::instrument;

use crate::http::{RequestDescriptor, ResilientClient};

#[derive(Clone)]
pub struct RecommendationsApi {
    client: ResilientClient,
}

impl RecommendationsApi {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    /// `POST /recommendations`
    #[instrument(skip(self, request), fields(minutes = request.available_minutes))]
    pub async fn get_recommendation(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, ClassifiedError> {
        self.client.send(&RequestDescriptor::post("/recommendations").json(request)).await
    }
}
