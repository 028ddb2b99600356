//! In-memory connection store

use async_trait::async_trait;
use lutem_domain::{ConnectionRecord, Result};
use tokio::sync::Mutex;

use super::ports::ConnectionStore;

/// [`ConnectionStore`] kept in process memory.
///
/// Useful for embedding without a filesystem and for tests.
#[derive(Debug, Default)]
pub struct InMemoryConnectionStore {
    record: Mutex<Option<ConnectionRecord>>,
}

impl InMemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `record`.
    pub fn with_record(record: ConnectionRecord) -> Self {
        Self { record: Mutex::new(Some(record)) }
    }
}

#[async_trait]
impl ConnectionStore for InMemoryConnectionStore {
    async fn load(&self) -> Result<Option<ConnectionRecord>> {
        Ok(self.record.lock().await.clone())
    }

    async fn save(&self, record: &ConnectionRecord) -> Result<()> {
        *self.record.lock().await = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.record.lock().await.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_load_clear() {
        let store = InMemoryConnectionStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        let record = ConnectionRecord { account_ref: Some("7656".into()), connected: true };
        store.save(&record).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(record));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
