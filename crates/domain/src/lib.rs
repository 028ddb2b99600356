//! # Lutem Domain
//!
//! Business domain types and models for Lutem.
//!
//! This crate contains:
//! - Library synchronization types (catalog snapshot, ledger, connection)
//! - Remote API data transfer objects
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - Depends only on the error taxonomy of `lutem-common`
//! - Pure domain models and data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use lutem_common::error::ClassifiedError;
pub use types::*;
