//! Session feedback endpoint

use lutem_common::error::ClassifiedError;
use lutem_domain::SessionFeedback;
use tracing::instrument;

use crate::http::{RequestDescriptor, ResilientClient};

#[derive(Clone)]
pub struct FeedbackApi {
    client: ResilientClient,
}

impl FeedbackApi {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    /// `POST /sessions/feedback`; the server may answer `204`.
    #[instrument(skip(self, feedback), fields(session_id = feedback.session_id))]
    pub async fn submit_feedback(&self, feedback: &SessionFeedback) -> Result<(), ClassifiedError> {
        let _: Option<serde_json::Value> =
            self.client.send(&RequestDescriptor::post("/sessions/feedback").json(feedback)).await?;
        Ok(())
    }
}
