//! Friends and friend requests

use lutem_common::error::ClassifiedError;
use lutem_domain::{ActionResponse, CountResponse, FriendRequest, UserSearchResult, UserSummary};
use tracing::instrument;

use crate::http::{RequestDescriptor, ResilientClient};

type ApiResult<T> = Result<T, ClassifiedError>;

#[derive(Clone)]
pub struct SocialApi {
    client: ResilientClient,
}

impl SocialApi {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    /// `GET /friends`
    #[instrument(skip(self))]
    pub async fn list_friends(&self) -> ApiResult<Vec<UserSummary>> {
        self.client.send(&RequestDescriptor::get("/friends")).await
    }

    /// `GET /friends/requests` (incoming)
    #[instrument(skip(self))]
    pub async fn incoming_requests(&self) -> ApiResult<Vec<FriendRequest>> {
        self.client.send(&RequestDescriptor::get("/friends/requests")).await
    }

    /// `GET /friends/requests/sent`
    #[instrument(skip(self))]
    pub async fn sent_requests(&self) -> ApiResult<Vec<FriendRequest>> {
        self.client.send(&RequestDescriptor::get("/friends/requests/sent")).await
    }

    /// `GET /friends/requests/count`
    #[instrument(skip(self))]
    pub async fn pending_request_count(&self) -> ApiResult<u32> {
        let response: CountResponse =
            self.client.send(&RequestDescriptor::get("/friends/requests/count")).await?;
        Ok(response.count)
    }

    /// `POST /friends/request/{userId}`
    #[instrument(skip(self))]
    pub async fn send_request(&self, user_id: i64) -> ApiResult<ActionResponse> {
        self.client.send(&RequestDescriptor::post(format!("/friends/request/{user_id}"))).await
    }

    /// `POST /friends/accept/{requestId}`
    #[instrument(skip(self))]
    pub async fn accept_request(&self, request_id: i64) -> ApiResult<ActionResponse> {
        self.client.send(&RequestDescriptor::post(format!("/friends/accept/{request_id}"))).await
    }

    /// `POST /friends/decline/{requestId}`
    #[instrument(skip(self))]
    pub async fn decline_request(&self, request_id: i64) -> ApiResult<ActionResponse> {
        self.client.send(&RequestDescriptor::post(format!("/friends/decline/{request_id}"))).await
    }

    /// `DELETE /friends/request/{requestId}`: withdraw an outgoing request
    #[instrument(skip(self))]
    pub async fn cancel_request(&self, request_id: i64) -> ApiResult<ActionResponse> {
        self.client.send(&RequestDescriptor::delete(format!("/friends/request/{request_id}"))).await
    }

    /// `DELETE /friends/{userId}`
    #[instrument(skip(self))]
    pub async fn remove_friend(&self, user_id: i64) -> ApiResult<ActionResponse> {
        self.client.send(&RequestDescriptor::delete(format!("/friends/{user_id}"))).await
    }

    /// `GET /friends/search?q=`; the server requires at least two characters.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> ApiResult<Vec<UserSearchResult>> {
        self.client.send(&RequestDescriptor::get("/friends/search").query("q", query)).await
    }
}
