use paracord_models::Message;
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;

/// Maps raw message payloads returned by the API into message entities.
pub trait MessageFactory: Send + Sync {
    fn from_raw(&self, raw: Value) -> Result<Message, ClientError>;
}

/// Default factory: plain serde decoding into [`Message`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMessageFactory;

impl MessageFactory for JsonMessageFactory {
    fn from_raw(&self, raw: Value) -> Result<Message, ClientError> {
        Ok(serde_json::from_value(raw)?)
    }
}

/// Body of a send-message request. Strings convert into a content-only
/// message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageReference {
    pub message_id: String,
}

impl CreateMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn tts(mut self, tts: bool) -> Self {
        self.tts = tts;
        self
    }

    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.message_reference = Some(MessageReference {
            message_id: message_id.into(),
        });
        self
    }
}

impl From<&str> for CreateMessage {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for CreateMessage {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

/// Query for listing channel messages. At most one of `before`, `after`,
/// `around` is honoured by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    pub limit: Option<u32>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub around: Option<String>,
}

impl MessageQuery {
    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn before(mut self, message_id: impl Into<String>) -> Self {
        self.before = Some(message_id.into());
        self
    }

    pub fn after(mut self, message_id: impl Into<String>) -> Self {
        self.after = Some(message_id.into());
        self
    }

    pub fn around(mut self, message_id: impl Into<String>) -> Self {
        self.around = Some(message_id.into());
        self
    }

    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(before) = &self.before {
            query.push(("before", before.clone()));
        }
        if let Some(after) = &self.after {
            query.push(("after", after.clone()));
        }
        if let Some(around) = &self.around {
            query.push(("around", around.clone()));
        }
        query
    }
}
