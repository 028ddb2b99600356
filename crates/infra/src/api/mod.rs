//! Domain API call groups for the Lutem backend
//!
//! Every group is a thin typed wrapper over [`ResilientClient`]: it names
//! the endpoint, shapes the request and decodes the response. Retry, CSRF
//! and error classification all happen in the client.
//!
//! [`LutemApi`] bundles the groups over one shared client so that they
//! share a cookie jar and therefore a CSRF token.

pub mod calendar;
pub mod catalog;
pub mod feedback;
pub mod library;
pub mod recommendations;
pub mod sessions;
pub mod social;

pub use calendar::CalendarApi;
pub use catalog::CatalogApi;
pub use feedback::FeedbackApi;
pub use library::LibraryApi;
pub use recommendations::RecommendationsApi;
pub use sessions::SessionsApi;
pub use social::SocialApi;

use lutem_domain::{LutemConfig, Result};

use crate::http::ResilientClient;

/// All call groups over a single client
#[derive(Clone)]
pub struct LutemApi {
    pub catalog: CatalogApi,
    pub recommendations: RecommendationsApi,
    pub feedback: FeedbackApi,
    pub sessions: SessionsApi,
    pub social: SocialApi,
    pub calendar: CalendarApi,
    pub library: LibraryApi,
    client: ResilientClient,
}

impl LutemApi {
    pub fn new(client: ResilientClient) -> Self {
        Self {
            catalog: CatalogApi::new(client.clone()),
            recommendations: RecommendationsApi::new(client.clone()),
            feedback: FeedbackApi::new(client.clone()),
            sessions: SessionsApi::new(client.clone()),
            social: SocialApi::new(client.clone()),
            calendar: CalendarApi::new(client.clone()),
            library: LibraryApi::new(client.clone()),
            client,
        }
    }

    /// Build the client from configuration and wrap it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL or retry settings
    /// are invalid.
    pub fn from_config(config: &LutemConfig) -> Result<Self> {
        Ok(Self::new(ResilientClient::from_config(config)?))
    }

    /// Forward the caller's identity on library calls.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.library = self.library.with_user_id(user_id);
        self
    }

    pub fn client(&self) -> &ResilientClient {
        &self.client
    }
}
