//! JSON-file implementation of [`ConnectionStore`]
//!
//! The file holds one JSON object keyed by namespace so that several records
//! (or other small state) can share it:
//!
//! ```json
//! { "lutem-steam": { "accountRef": "76561198000000001", "connected": true } }
//! ```
//!
//! Writes go to a sibling temporary file that is then renamed over the
//! original, so a crash never leaves a half-written file behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lutem_core::ConnectionStore;
use lutem_domain::{ConnectionRecord, LutemError, Result, StorageConfig};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::errors::InfraError;

#[derive(Debug)]
pub struct JsonFileConnectionStore {
    path: PathBuf,
    namespace: String,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileConnectionStore {
    pub fn new(path: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self { path: path.into(), namespace: namespace.into(), write_lock: Mutex::new(()) }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.state_path.clone(), config.namespace.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Map<String, Value>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(InfraError::from(err).into()),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents).map_err(InfraError::from)? {
            Value::Object(map) => Ok(map),
            _ => Err(LutemError::Storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }

    async fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(document).map_err(InfraError::from)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(InfraError::from)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await.map_err(InfraError::from)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(InfraError::from)?;
        Ok(())
    }
}

#[async_trait]
impl ConnectionStore for JsonFileConnectionStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<ConnectionRecord>> {
        let document = self.read_document().await?;
        document
            .get(&self.namespace)
            .cloned()
            .map(|value| serde_json::from_value(value).map_err(|e| InfraError::from(e).into()))
            .transpose()
    }

    #[instrument(skip(self, record), fields(path = %self.path.display()))]
    async fn save(&self, record: &ConnectionRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        let value = serde_json::to_value(record).map_err(InfraError::from)?;
        document.insert(self.namespace.clone(), value);
        self.write_document(&document).await?;
        debug!(connected = record.connected, "Connection record saved");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        if document.remove(&self.namespace).is_some() {
            self.write_document(&document).await?;
            debug!("Connection record cleared");
        }
        Ok(())
    }
}
