//! # Lutem Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for remote library operations and
//!   durable connection state
//! - The library synchronization pipeline and its observable state
//!
//! ## Architecture Principles
//! - Only depends on `lutem-common` and `lutem-domain`
//! - No HTTP, filesystem or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod library;

// Re-export specific items to avoid ambiguity
pub use library::{
    ConnectionStore, InMemoryConnectionStore, LibraryGateway, LibraryState, LibraryStateStore,
    LibrarySyncPipeline,
};
