//! Library synchronization: ports, observable state and the pipeline

pub mod memory_store;
pub mod pipeline;
pub mod ports;
pub mod state;

pub use memory_store::InMemoryConnectionStore;
pub use pipeline::LibrarySyncPipeline;
pub use ports::{ConnectionStore, LibraryGateway};
pub use state::{LibraryState, LibraryStateStore};
