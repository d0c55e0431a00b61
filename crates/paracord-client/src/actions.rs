//! Guarded channel actions.
//!
//! Every action runs structural validation and permission checks before
//! touching the transport, so a rejected call never issues a request.
//! Channels without a guild skip permission checks entirely.

use paracord_models::{Channel, Message, Permissions};
use paracord_util::validation::{self, MAX_BULK_DELETE};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::channel::{ChannelPatch, CreateInvite};
use crate::config::OversizePolicy;
use crate::error::ClientError;
use crate::guild::GuildPermissionOracle;
use crate::message::{CreateMessage, MessageFactory, MessageQuery};
use crate::overwrites::{self, Resolution};
use crate::transport::Transport;
use crate::{routes, Client};

const READ_HISTORY: &[Permissions] = &[
    Permissions::VIEW_CHANNEL,
    Permissions::READ_MESSAGE_HISTORY,
];

/// A cached channel bound to the client that performs its requests.
pub struct ChannelHandle<'a, T, G, M> {
    client: &'a Client<T, G, M>,
    channel: Arc<Channel>,
}

impl<'a, T, G, M> ChannelHandle<'a, T, G, M>
where
    T: Transport,
    G: GuildPermissionOracle,
    M: MessageFactory,
{
    pub fn new(client: &'a Client<T, G, M>, channel: Arc<Channel>) -> Self {
        Self { client, channel }
    }

    pub fn channel(&self) -> &Arc<Channel> {
        &self.channel
    }

    pub fn id(&self) -> &str {
        &self.channel.id
    }

    /// Whether the client holds every flag in this channel.
    ///
    /// Always true outside a guild, matching the guarded actions.
    pub fn has_permission(&self, required: &[Permissions]) -> bool {
        match self.channel.guild_id.as_deref() {
            Some(guild_id) => self.resolve(guild_id, required).is_granted(),
            None => true,
        }
    }

    pub async fn fetch_message(&self, message_id: &str) -> Result<Message, ClientError> {
        self.require_channel_permissions(READ_HISTORY)?;

        let raw = self
            .client
            .transport
            .get(&routes::channel_message(&self.channel.id, message_id), &[])
            .await?;
        self.client.messages.from_raw(raw)
    }

    /// An oversized `limit` is an error under the strict policy; under the
    /// lenient policy nothing is fetched and an empty list is returned.
    pub async fn list_messages(&self, query: &MessageQuery) -> Result<Vec<Message>, ClientError> {
        if let Err(err) = validation::validate_fetch_limit(query.limit) {
            match self.client.oversize {
                OversizePolicy::Strict => return Err(err.into()),
                OversizePolicy::Lenient => {
                    tracing::warn!(channel_id = %self.channel.id, "{err}; skipping fetch");
                    return Ok(Vec::new());
                }
            }
        }
        self.require_channel_permissions(READ_HISTORY)?;

        let raw = self
            .client
            .transport
            .get(&routes::channel_messages(&self.channel.id), &query.to_query())
            .await?;
        self.map_messages(raw)
    }

    pub async fn list_pins(&self) -> Result<Vec<Message>, ClientError> {
        let raw = self
            .client
            .transport
            .get(&routes::channel_pins(&self.channel.id), &[])
            .await?;
        self.map_messages(raw)
    }

    pub async fn send_message(
        &self,
        message: impl Into<CreateMessage>,
    ) -> Result<Message, ClientError> {
        let message = message.into();
        if let Some(content) = &message.content {
            validation::validate_message_content(content)?;
        }

        self.require_channel_permissions(&[Permissions::SEND_MESSAGES])?;
        if message.tts {
            self.require_channel_permissions(&[Permissions::SEND_TTS_MESSAGES])?;
        }

        let raw = self
            .client
            .transport
            .post(
                &routes::channel_messages(&self.channel.id),
                Some(serde_json::to_value(&message)?),
            )
            .await?;
        self.client.messages.from_raw(raw)
    }

    /// Returns the number of ids sent to the server.
    ///
    /// Over 100 ids is an error under the strict policy; under the lenient
    /// policy only the first 100 are sent.
    pub async fn delete_messages(
        &self,
        message_ids: &[String],
        reason: Option<&str>,
    ) -> Result<usize, ClientError> {
        validation::validate_bulk_delete_min(message_ids.len())?;
        let ids = match validation::validate_bulk_delete_max(message_ids.len()) {
            Ok(()) => message_ids,
            Err(err) => match self.client.oversize {
                OversizePolicy::Strict => return Err(err.into()),
                OversizePolicy::Lenient => {
                    tracing::warn!(
                        channel_id = %self.channel.id,
                        requested = message_ids.len(),
                        "bulk delete truncated to the first {} messages",
                        MAX_BULK_DELETE
                    );
                    &message_ids[..MAX_BULK_DELETE]
                }
            },
        };

        self.require_channel_permissions(&[Permissions::MANAGE_MESSAGES])?;

        let mut body = json!({ "messages": ids });
        if let Some(reason) = reason {
            body["reason"] = json!(reason);
        }
        self.client
            .transport
            .post(&routes::bulk_delete(&self.channel.id), Some(body))
            .await?;
        Ok(ids.len())
    }

    pub async fn list_invites(&self) -> Result<Value, ClientError> {
        self.require_guild_permission(Permissions::MANAGE_CHANNELS)?;
        Ok(self
            .client
            .transport
            .get(&routes::channel_invites(&self.channel.id), &[])
            .await?)
    }

    pub async fn create_invite(&self, options: &CreateInvite) -> Result<Value, ClientError> {
        self.require_guild_permission(Permissions::CREATE_INSTANT_INVITE)?;
        Ok(self
            .client
            .transport
            .post(
                &routes::channel_invites(&self.channel.id),
                Some(serde_json::to_value(options)?),
            )
            .await?)
    }

    pub async fn list_webhooks(&self) -> Result<Value, ClientError> {
        self.require_guild_permission(Permissions::MANAGE_WEBHOOKS)?;
        Ok(self
            .client
            .transport
            .get(&routes::channel_webhooks(&self.channel.id), &[])
            .await?)
    }

    /// Returns the server's response as-is. The cached entity is not
    /// updated; the next channel payload replaces it.
    pub async fn edit(&self, patch: &ChannelPatch) -> Result<Value, ClientError> {
        Ok(self
            .client
            .transport
            .patch(
                &routes::channel(&self.channel.id),
                Some(serde_json::to_value(patch)?),
            )
            .await?)
    }

    fn resolve(&self, guild_id: &str, required: &[Permissions]) -> Resolution {
        let oracle = &self.client.guild_permissions;
        overwrites::evaluate(
            &self.channel.overwrites,
            &self.client.user_id,
            Some(guild_id),
            required,
            |gid, flag| oracle.check(gid, flag),
        )
    }

    fn require_channel_permissions(&self, required: &[Permissions]) -> Result<(), ClientError> {
        let Some(guild_id) = self.channel.guild_id.as_deref() else {
            return Ok(());
        };
        let missing = match self.resolve(guild_id, required) {
            Resolution::Granted => return Ok(()),
            Resolution::NoOverwrite => required.first().copied().unwrap_or_default(),
            Resolution::Missing(flag) => flag,
        };
        Err(self.denied(missing))
    }

    fn require_guild_permission(&self, required: Permissions) -> Result<(), ClientError> {
        match self.channel.guild_id.as_deref() {
            Some(guild_id) if !self.client.guild_permissions.check(guild_id, required) => {
                Err(self.denied(required))
            }
            _ => Ok(()),
        }
    }

    fn denied(&self, flag: Permissions) -> ClientError {
        let permission = flag.name().unwrap_or("UNKNOWN");
        tracing::debug!(channel_id = %self.channel.id, permission, "permission denied");
        ClientError::PermissionDenied { permission }
    }

    fn map_messages(&self, raw: Value) -> Result<Vec<Message>, ClientError> {
        let items: Vec<Value> = serde_json::from_value(raw)?;
        items
            .into_iter()
            .map(|item| self.client.messages.from_raw(item))
            .collect()
    }
}
