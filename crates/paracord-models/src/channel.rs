use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::permissions::Permissions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ChannelType {
    #[default]
    Text,
    Dm,
    Voice,
    GroupDm,
    Category,
    Announcement,
    /// A type this client does not know about yet.
    Unknown(u8),
}

impl From<u8> for ChannelType {
    fn from(raw: u8) -> Self {
        match raw {
            0 => Self::Text,
            1 => Self::Dm,
            2 => Self::Voice,
            3 => Self::GroupDm,
            4 => Self::Category,
            5 => Self::Announcement,
            other => Self::Unknown(other),
        }
    }
}

impl From<ChannelType> for u8 {
    fn from(kind: ChannelType) -> Self {
        match kind {
            ChannelType::Text => 0,
            ChannelType::Dm => 1,
            ChannelType::Voice => 2,
            ChannelType::GroupDm => 3,
            ChannelType::Category => 4,
            ChannelType::Announcement => 5,
            ChannelType::Unknown(other) => other,
        }
    }
}

/// Per-channel allow/deny pair for a member or role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overwrite {
    #[serde(rename = "id")]
    pub target_id: String,
    pub allow: Permissions,
    pub deny: Permissions,
}

/// Channel object as received from the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelPayload {
    pub id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ChannelType,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub permission_overwrites: Option<Vec<Overwrite>>,
    #[serde(default)]
    pub nsfw: Option<bool>,
    #[serde(default)]
    pub rate_limit_per_user: Option<u32>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub last_message_id: Option<String>,
    #[serde(default)]
    pub last_pin_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub id: String,
    pub guild_id: Option<String>,
    pub kind: ChannelType,
    pub name: Option<String>,
    pub topic: Option<String>,
    pub position: Option<i32>,
    pub overwrites: Vec<Overwrite>,
    pub nsfw: bool,
    pub rate_limit_per_user: Option<u32>,
    pub parent_id: Option<String>,
    pub last_message_id: Option<String>,
    pub last_pin_timestamp: Option<DateTime<Utc>>,
    /// `<#id>` markup that renders as a channel link.
    pub mention: String,
}

impl Channel {
    pub fn mention_for(id: &str) -> String {
        format!("<#{id}>")
    }

    pub fn is_guild_channel(&self) -> bool {
        self.guild_id.is_some()
    }

    pub fn overwrite_for(&self, target_id: &str) -> Option<&Overwrite> {
        self.overwrites.iter().find(|o| o.target_id == target_id)
    }
}
