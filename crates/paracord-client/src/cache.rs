use dashmap::DashMap;
use paracord_models::{Channel, Overwrite};
use std::sync::Arc;

/// In-memory index: channel id -> latest constructed channel.
///
/// Entries are replaced wholesale on every `put`; there is no TTL or
/// eviction. Owners clear it on reconnect or shutdown.
#[derive(Debug, Default)]
pub struct ChannelCache {
    channels: DashMap<String, Arc<Channel>>,
}

impl ChannelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Last write wins.
    pub fn put(&self, channel: Arc<Channel>) {
        tracing::debug!(channel_id = %channel.id, "channel cached");
        self.channels.insert(channel.id.clone(), channel);
    }

    pub fn get(&self, channel_id: &str) -> Option<Arc<Channel>> {
        self.channels.get(channel_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Overwrites of a cached channel, for callers that only need the ACL.
    pub fn overwrites(&self, channel_id: &str) -> Option<Vec<Overwrite>> {
        self.channels
            .get(channel_id)
            .map(|entry| entry.overwrites.clone())
    }

    pub fn remove(&self, channel_id: &str) -> Option<Arc<Channel>> {
        self.channels.remove(channel_id).map(|(_, channel)| channel)
    }

    pub fn clear(&self) {
        let dropped = self.channels.len();
        self.channels.clear();
        tracing::debug!(dropped, "channel cache cleared");
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
