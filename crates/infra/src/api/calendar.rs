//! Calendar events and invitations

use chrono::NaiveDateTime;
use lutem_common::error::ClassifiedError;
use lutem_domain::{ActionResponse, CalendarEvent, EventDraft, EventInvitation, EventQuery};
use tracing::instrument;

use crate::http::{RequestDescriptor, ResilientClient};

type ApiResult<T> = Result<T, ClassifiedError>;

/// Local date-time format the calendar endpoints accept as range bounds
const RANGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Clone)]
pub struct CalendarApi {
    client: ResilientClient,
}

impl CalendarApi {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    /// `GET /calendar/events`: events visible to the caller
    #[instrument(skip(self))]
    pub async fn list_events(&self, query: &EventQuery) -> ApiResult<Vec<CalendarEvent>> {
        let mut request = with_range(RequestDescriptor::get("/calendar/events"), query);
        if query.friends_only {
            request = request.query("friendsOnly", "true");
        }
        self.client.send(&request).await
    }

    /// `GET /calendar/events/mine`
    #[instrument(skip(self))]
    pub async fn my_events(&self, query: &EventQuery) -> ApiResult<Vec<CalendarEvent>> {
        self.client.send(&with_range(RequestDescriptor::get("/calendar/events/mine"), query)).await
    }

    /// `GET /calendar/events/{id}`
    #[instrument(skip(self))]
    pub async fn get_event(&self, id: i64) -> ApiResult<CalendarEvent> {
        self.client.send(&RequestDescriptor::get(format!("/calendar/events/{id}"))).await
    }

    /// `POST /calendar/events`
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_event(&self, draft: &EventDraft) -> ApiResult<CalendarEvent> {
        self.client.send(&RequestDescriptor::post("/calendar/events").json(draft)).await
    }

    /// `PUT /calendar/events/{id}`
    #[instrument(skip(self, draft))]
    pub async fn update_event(&self, id: i64, draft: &EventDraft) -> ApiResult<CalendarEvent> {
        self.client.send(&RequestDescriptor::put(format!("/calendar/events/{id}")).json(draft)).await
    }

    /// `DELETE /calendar/events/{id}`
    #[instrument(skip(self))]
    pub async fn delete_event(&self, id: i64) -> ApiResult<ActionResponse> {
        let response: Option<ActionResponse> =
            self.client.send(&RequestDescriptor::delete(format!("/calendar/events/{id}"))).await?;
        Ok(response.unwrap_or_default())
    }

    /// `POST /calendar/events/{id}/join`
    #[instrument(skip(self))]
    pub async fn join_event(&self, id: i64) -> ApiResult<ActionResponse> {
        self.client.send(&RequestDescriptor::post(format!("/calendar/events/{id}/join"))).await
    }

    /// `POST /calendar/events/{id}/leave`
    #[instrument(skip(self))]
    pub async fn leave_event(&self, id: i64) -> ApiResult<ActionResponse> {
        self.client.send(&RequestDescriptor::post(format!("/calendar/events/{id}/leave"))).await
    }

    /// `POST /calendar/events/{id}/invite/{userId}`
    #[instrument(skip(self))]
    pub async fn invite(&self, event_id: i64, user_id: i64) -> ApiResult<ActionResponse> {
        let path = format!("/calendar/events/{event_id}/invite/{user_id}");
        self.client.send(&RequestDescriptor::post(path)).await
    }

    /// `GET /calendar/invitations`: pending invitations for the caller
    #[instrument(skip(self))]
    pub async fn invitations(&self) -> ApiResult<Vec<EventInvitation>> {
        self.client.send(&RequestDescriptor::get("/calendar/invitations")).await
    }

    /// `POST /calendar/invitations/{id}/respond?accept=`
    #[instrument(skip(self))]
    pub async fn respond_to_invitation(&self, id: i64, accept: bool) -> ApiResult<ActionResponse> {
        let request = RequestDescriptor::post(format!("/calendar/invitations/{id}/respond"))
            .query("accept", accept.to_string());
        self.client.send(&request).await
    }
}

fn with_range(mut request: RequestDescriptor, query: &EventQuery) -> RequestDescriptor {
    if let Some(start) = query.start {
        request = request.query("start", format_bound(start));
    }
    if let Some(end) = query.end {
        request = request.query("end", format_bound(end));
    }
    request
}

fn format_bound(at: NaiveDateTime) -> String {
    at.format(RANGE_FORMAT).to_string()
}
