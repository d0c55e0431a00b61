use paracord_models::{Channel, ChannelPayload, Overwrite, Permissions};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::ChannelCache;
use crate::error::ClientError;

/// Builds channel entities from API payloads and registers them in a cache.
#[derive(Debug, Clone, Copy)]
pub struct ChannelFactory<'a> {
    cache: &'a ChannelCache,
}

impl<'a> ChannelFactory<'a> {
    pub fn new(cache: &'a ChannelCache) -> Self {
        Self { cache }
    }

    /// Build the entity and replace any cached channel with the same id.
    pub fn create(&self, raw: ChannelPayload) -> Arc<Channel> {
        let overwrites = raw
            .permission_overwrites
            .unwrap_or_default()
            .into_iter()
            .map(|o| Overwrite {
                target_id: o.target_id,
                allow: Permissions::encode(&o.allow.decode()),
                deny: Permissions::encode(&o.deny.decode()),
            })
            .collect();

        let channel = Arc::new(Channel {
            mention: Channel::mention_for(&raw.id),
            id: raw.id,
            guild_id: raw.guild_id,
            kind: raw.kind,
            name: raw.name,
            topic: raw.topic,
            position: raw.position,
            overwrites,
            nsfw: raw.nsfw.unwrap_or(false),
            rate_limit_per_user: raw.rate_limit_per_user,
            parent_id: raw.parent_id,
            last_message_id: raw.last_message_id,
            last_pin_timestamp: raw.last_pin_timestamp,
        });

        self.cache.put(Arc::clone(&channel));
        channel
    }

    pub fn create_from_value(&self, raw: Value) -> Result<Arc<Channel>, ClientError> {
        let payload: ChannelPayload = serde_json::from_value(raw)?;
        Ok(self.create(payload))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateInvite {
    /// Seconds until expiry, 0 for never.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,
    pub temporary: bool,
    pub unique: bool,
}

/// Partial channel update. Unset fields are left unchanged by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_user: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_overwrites: Option<Vec<Overwrite>>,
}
