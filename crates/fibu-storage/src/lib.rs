//! # Fibu Storage
//!
//! A durable [`ChannelStore`] that keeps one JSON document per channel.
//!
//! # Layout
//!
//! | Path | Purpose |
//! |------|---------|
//! | `<data_dir>/<channel>.json` | The channel's [`ChannelConfig`] |
//! | `<data_dir>/<channel>.json.tmp` | Write in progress, renamed over the document when complete |
//!
//! Every document is loaded into memory by [`FileStore::open`]. Reads are
//! served from memory; writes go to disk first and are only committed to
//! memory once the rename succeeded, so a failed write leaves both unchanged.
//!
//! Configure the directory via `fibubot.toml`:
//!
//! ```toml
//! [storage]
//! data_dir = "./data"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fibu_core::{ChannelConfig, ChannelId, ChannelPatch, ChannelStore, StoreError, StoreResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const DOCUMENT_EXT: &str = "json";

// =============================================================================
// Configuration
// =============================================================================

/// Storage section of the bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one document per channel. Defaults to `./data`.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// `None` marks a record deleted while another task still held its entry.
type Slot = Arc<Mutex<Option<ChannelConfig>>>;

/// File-backed channel store.
pub struct FileStore {
    dir: PathBuf,
    channels: RwLock<HashMap<ChannelId, Slot>>,
}

impl FileStore {
    /// Opens (creating if needed) the store rooted at `dir` and loads every
    /// document in it.
    ///
    /// Unreadable or malformed documents are skipped with a warning.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        let mut channels = HashMap::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXT) {
                continue;
            }
            match load_document(&path).await {
                Ok(config) => {
                    channels.insert(config.channel.clone(), Arc::new(Mutex::new(Some(config))));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable channel document");
                }
            }
        }

        info!(dir = %dir.display(), channels = channels.len(), "Channel store opened");
        Ok(Self {
            dir,
            channels: RwLock::new(channels),
        })
    }

    /// Opens the store described by `config`.
    pub async fn from_config(config: &StorageConfig) -> StoreResult<Self> {
        Self::open(&config.data_dir).await
    }

    /// The directory documents are kept in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot(&self, channel: &ChannelId) -> StoreResult<Slot> {
        self.channels
            .read()
            .get(channel)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(channel.clone()))
    }

    fn document_path(&self, channel: &ChannelId) -> StoreResult<PathBuf> {
        let name = channel.as_str();
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            return Err(StoreError::Io(format!(
                "channel id '{name}' cannot be used as a file name"
            )));
        }
        Ok(self.dir.join(format!("{name}.{DOCUMENT_EXT}")))
    }

    async fn persist(&self, config: &ChannelConfig) -> StoreResult<()> {
        let path = self.document_path(&config.channel)?;
        let tmp = path.with_extension(format!("{DOCUMENT_EXT}.tmp"));
        let body = serde_json::to_vec_pretty(config)?;
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &path).await?;
        debug!(channel = %config.channel, "Channel document written");
        Ok(())
    }

    /// Applies `mutate` to a copy of the record, persists it, then commits.
    async fn modify<F>(&self, channel: &ChannelId, mutate: F) -> StoreResult<ChannelConfig>
    where
        F: FnOnce(&mut ChannelConfig) + Send,
    {
        let slot = self.slot(channel)?;
        let mut guard = slot.lock().await;
        let current = guard
            .as_ref()
            .ok_or_else(|| StoreError::NotFound(channel.clone()))?;
        let mut updated = current.clone();
        mutate(&mut updated);
        self.persist(&updated).await?;
        *guard = Some(updated.clone());
        Ok(updated)
    }
}

async fn load_document(path: &Path) -> StoreResult<ChannelConfig> {
    let raw = fs::read(path).await?;
    let config: ChannelConfig = serde_json::from_slice(&raw)?;
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if config.channel.as_str() != stem {
        return Err(StoreError::Serialization(format!(
            "document names channel '{}' but file is '{stem}'",
            config.channel
        )));
    }
    Ok(config)
}

#[async_trait]
impl ChannelStore for FileStore {
    async fn get(&self, channel: &ChannelId) -> StoreResult<ChannelConfig> {
        let slot = self.slot(channel)?;
        let guard = slot.lock().await;
        guard
            .clone()
            .ok_or_else(|| StoreError::NotFound(channel.clone()))
    }

    async fn create(&self, config: ChannelConfig) -> StoreResult<()> {
        let channel = config.channel.clone();
        self.document_path(&channel)?;

        let slot: Slot = Arc::new(Mutex::new(None));
        let mut guard = slot.lock().await;
        {
            let mut channels = self.channels.write();
            if channels.contains_key(&channel) {
                return Err(StoreError::AlreadyExists(channel));
            }
            channels.insert(channel.clone(), Arc::clone(&slot));
        }

        if let Err(e) = self.persist(&config).await {
            self.channels.write().remove(&channel);
            return Err(e);
        }
        *guard = Some(config);
        info!(channel = %channel, "Channel record created");
        Ok(())
    }

    async fn delete(&self, channel: &ChannelId) -> StoreResult<()> {
        let path = self.document_path(channel)?;
        let slot = self.slot(channel)?;
        let mut guard = slot.lock().await;
        if guard.is_none() {
            return Err(StoreError::NotFound(channel.clone()));
        }

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        *guard = None;

        // The entry stays mapped until the unlink is done, so a concurrent
        // create sees `AlreadyExists` rather than racing the removal.
        let mut channels = self.channels.write();
        if channels
            .get(channel)
            .is_some_and(|current| Arc::ptr_eq(current, &slot))
        {
            channels.remove(channel);
        }
        drop(channels);

        info!(channel = %channel, "Channel record deleted");
        Ok(())
    }

    async fn update_fields(
        &self,
        channel: &ChannelId,
        patch: ChannelPatch,
    ) -> StoreResult<ChannelConfig> {
        self.modify(channel, |config| config.apply(patch)).await
    }

    async fn upsert_command(
        &self,
        channel: &ChannelId,
        trigger: &str,
        text: &str,
    ) -> StoreResult<()> {
        self.modify(channel, |config| {
            config
                .custom_commands
                .insert(trigger.to_string(), text.to_string());
        })
        .await?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<ChannelId>> {
        let mut ids: Vec<_> = self.channels.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("dir", &self.dir)
            .field("channels", &self.channels.read().len())
            .finish()
    }
}
