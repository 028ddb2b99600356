//! # Lutem Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The resilient request client (reqwest, retry with backoff, CSRF)
//! - Domain API call groups, including the library gateway
//! - Configuration loading (environment, `.env`, JSON/TOML files)
//! - File-backed persistence of the library connection record
//! - Logging bootstrap
//!
//! ## Architecture
//! - Implements traits defined in `lutem-core`
//! - Depends on `lutem-common`, `lutem-domain` and `lutem-core`
//! - Contains all "impure" code (network and filesystem I/O)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod storage;

// Re-export commonly used items
pub use api::{
    CalendarApi, CatalogApi, FeedbackApi, LibraryApi, LutemApi, RecommendationsApi, SessionsApi,
    SocialApi,
};
pub use errors::InfraError;
pub use http::{RequestDescriptor, RequestOptions, ResilientClient, ResilientClientBuilder};
pub use storage::JsonFileConnectionStore;
