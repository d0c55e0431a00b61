//! API path builders. Paths are relative to the configured base URL.

pub fn channel(channel_id: &str) -> String {
    format!("/channels/{channel_id}")
}

pub fn channel_messages(channel_id: &str) -> String {
    format!("/channels/{channel_id}/messages")
}

pub fn channel_message(channel_id: &str, message_id: &str) -> String {
    format!("/channels/{channel_id}/messages/{message_id}")
}

pub fn channel_pins(channel_id: &str) -> String {
    format!("/channels/{channel_id}/pins")
}

pub fn bulk_delete(channel_id: &str) -> String {
    format!("/channels/{channel_id}/messages/bulk-delete")
}

pub fn channel_invites(channel_id: &str) -> String {
    format!("/channels/{channel_id}/invites")
}

pub fn channel_webhooks(channel_id: &str) -> String {
    format!("/channels/{channel_id}/webhooks")
}
