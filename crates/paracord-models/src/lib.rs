pub mod channel;
pub mod message;
pub mod permissions;

pub use channel::{Channel, ChannelPayload, ChannelType, Overwrite};
pub use message::{Message, MessageAuthor, MessageType};
pub use permissions::Permissions;
