pub mod actions;
pub mod cache;
pub mod channel;
pub mod config;
pub mod error;
pub mod guild;
pub mod message;
pub mod overwrites;
pub mod routes;
pub mod transport;

pub use actions::ChannelHandle;
pub use cache::ChannelCache;
pub use channel::{ChannelFactory, ChannelPatch, CreateInvite};
pub use config::{ClientConfig, OversizePolicy};
pub use error::{ClientError, ConfigError, TransportError};
pub use guild::{GuildPermissionOracle, GuildPermissionTable};
pub use message::{CreateMessage, JsonMessageFactory, MessageFactory, MessageQuery};
pub use transport::{HttpTransport, Transport};

use paracord_models::{Channel, ChannelPayload};
use std::sync::Arc;

/// Collaborators shared by every channel handle: the transport, the guild
/// permission oracle, the message factory and the channel cache.
pub struct Client<T, G, M = JsonMessageFactory> {
    user_id: String,
    oversize: OversizePolicy,
    transport: T,
    guild_permissions: G,
    messages: M,
    channels: Arc<ChannelCache>,
}

impl Client<HttpTransport, GuildPermissionTable, JsonMessageFactory> {
    /// HTTP transport, an empty guild permission table and serde message
    /// decoding.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(
            config,
            transport,
            GuildPermissionTable::new(),
            JsonMessageFactory,
        ))
    }
}

impl<T, G, M> Client<T, G, M>
where
    T: Transport,
    G: GuildPermissionOracle,
    M: MessageFactory,
{
    pub fn new(config: &ClientConfig, transport: T, guild_permissions: G, messages: M) -> Self {
        Self {
            user_id: config.api.user_id.clone(),
            oversize: config.validation.oversize,
            transport,
            guild_permissions,
            messages,
            channels: Arc::new(ChannelCache::new()),
        }
    }

    /// Share an existing cache instead of the client's own.
    pub fn with_cache(mut self, channels: Arc<ChannelCache>) -> Self {
        self.channels = channels;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn guild_permissions(&self) -> &G {
        &self.guild_permissions
    }

    pub fn channels(&self) -> &Arc<ChannelCache> {
        &self.channels
    }

    pub fn factory(&self) -> ChannelFactory<'_> {
        ChannelFactory::new(&self.channels)
    }

    /// Build a channel from a payload, cache it and return a handle to it.
    pub fn create_channel(&self, raw: ChannelPayload) -> ChannelHandle<'_, T, G, M> {
        let channel = self.factory().create(raw);
        self.handle(channel)
    }

    /// Handle for a cached channel.
    pub fn channel(&self, channel_id: &str) -> Option<ChannelHandle<'_, T, G, M>> {
        self.channels.get(channel_id).map(|channel| self.handle(channel))
    }

    pub fn handle(&self, channel: Arc<Channel>) -> ChannelHandle<'_, T, G, M> {
        ChannelHandle::new(self, channel)
    }

    /// Drop all cached channels. Call on reconnect and shutdown.
    pub fn reset(&self) {
        tracing::info!(channels = self.channels.len(), "resetting client state");
        self.channels.clear();
    }
}
