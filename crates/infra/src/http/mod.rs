//! Resilient request client

pub mod client;
pub mod csrf;
pub mod request;

pub use client::{ResilientClient, ResilientClientBuilder};
pub use csrf::CsrfTokenSource;
pub use request::{RequestDescriptor, RequestOptions};
