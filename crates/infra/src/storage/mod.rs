//! Durable local state

pub mod connection_store;

pub use connection_store::JsonFileConnectionStore;
