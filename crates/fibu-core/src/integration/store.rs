//! Channel store contract.
//!
//! The store is the single source of truth for per-channel configuration.
//! Every operation is atomic with respect to one channel; nothing ever spans
//! two channels, so implementations only need per-channel locking.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::foundation::{ChannelConfig, ChannelId, ChannelPatch, StoreError, StoreResult};

/// Durable per-channel key-value store.
#[async_trait]
pub trait ChannelStore: Send + Sync + 'static {
    /// Returns the record for `channel`.
    async fn get(&self, channel: &ChannelId) -> StoreResult<ChannelConfig>;

    /// Registers `config.channel` with the given initial record.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the channel is registered.
    async fn create(&self, config: ChannelConfig) -> StoreResult<()>;

    /// Removes the record for `channel`.
    async fn delete(&self, channel: &ChannelId) -> StoreResult<()>;

    /// Applies `patch` to the record and returns the updated record.
    async fn update_fields(
        &self,
        channel: &ChannelId,
        patch: ChannelPatch,
    ) -> StoreResult<ChannelConfig>;

    /// Inserts or replaces one custom command.
    async fn upsert_command(&self, channel: &ChannelId, trigger: &str, text: &str)
    -> StoreResult<()>;

    /// Returns every registered channel.
    async fn list(&self) -> StoreResult<Vec<ChannelId>>;
}

/// A shared channel store trait object.
pub type BoxedStore = Arc<dyn ChannelStore>;

// =============================================================================
// MemoryStore
// =============================================================================

/// Non-durable store used in tests and for ephemeral deployments.
///
/// The outer map lock is only held to look up, insert or remove an entry;
/// mutations happen under the entry's own lock.
#[derive(Default)]
pub struct MemoryStore {
    channels: RwLock<HashMap<ChannelId, Arc<Mutex<ChannelConfig>>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `configs`.
    pub fn with_channels(configs: impl IntoIterator<Item = ChannelConfig>) -> Self {
        let channels = configs
            .into_iter()
            .map(|c| (c.channel.clone(), Arc::new(Mutex::new(c))))
            .collect();
        Self {
            channels: RwLock::new(channels),
        }
    }

    fn entry(&self, channel: &ChannelId) -> StoreResult<Arc<Mutex<ChannelConfig>>> {
        self.channels
            .read()
            .get(channel)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(channel.clone()))
    }
}

#[async_trait]
impl ChannelStore for MemoryStore {
    async fn get(&self, channel: &ChannelId) -> StoreResult<ChannelConfig> {
        Ok(self.entry(channel)?.lock().clone())
    }

    async fn create(&self, config: ChannelConfig) -> StoreResult<()> {
        let mut channels = self.channels.write();
        if channels.contains_key(&config.channel) {
            return Err(StoreError::AlreadyExists(config.channel));
        }
        debug!(channel = %config.channel, "Created channel record");
        channels.insert(config.channel.clone(), Arc::new(Mutex::new(config)));
        Ok(())
    }

    async fn delete(&self, channel: &ChannelId) -> StoreResult<()> {
        if self.channels.write().remove(channel).is_none() {
            return Err(StoreError::NotFound(channel.clone()));
        }
        debug!(channel = %channel, "Deleted channel record");
        Ok(())
    }

    async fn update_fields(
        &self,
        channel: &ChannelId,
        patch: ChannelPatch,
    ) -> StoreResult<ChannelConfig> {
        let entry = self.entry(channel)?;
        let mut config = entry.lock();
        config.apply(patch);
        Ok(config.clone())
    }

    async fn upsert_command(
        &self,
        channel: &ChannelId,
        trigger: &str,
        text: &str,
    ) -> StoreResult<()> {
        let entry = self.entry(channel)?;
        entry
            .lock()
            .custom_commands
            .insert(trigger.to_string(), text.to_string());
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<ChannelId>> {
        let mut ids: Vec<_> = self.channels.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_twice_fails() {
        let store = MemoryStore::new();
        let config = ChannelConfig::new("fibu".into());
        store.create(config.clone()).await.unwrap();
        let result = store.create(config).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_mutations_on_unknown_channel_fail() {
        let store = MemoryStore::new();
        let channel = ChannelId::new("ghost");

        assert!(matches!(
            store.delete(&channel).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.update_fields(&channel, ChannelPatch::default()).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.upsert_command(&channel, "!a", "b").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_command_replaces() {
        let store = MemoryStore::with_channels([ChannelConfig::new("fibu".into())]);
        let channel = ChannelId::new("fibu");
        store.upsert_command(&channel, "!foo", "one").await.unwrap();
        store.upsert_command(&channel, "!foo", "two").await.unwrap();

        let config = store.get(&channel).await.unwrap();
        assert_eq!(config.custom_commands.len(), 1);
        assert_eq!(config.custom_commands["!foo"], "two");
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let store = MemoryStore::with_channels([
            ChannelConfig::new("zeta".into()),
            ChannelConfig::new("alpha".into()),
        ]);
        let ids = store.list().await.unwrap();
        assert_eq!(ids, vec![ChannelId::new("alpha"), ChannelId::new("zeta")]);
    }
}
