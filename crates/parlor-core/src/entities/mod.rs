//! Domain entities

mod channel;
mod initial_data;
mod message;
mod server;
mod user;

pub use channel::{Channel, ChannelKind, ChannelReadState, ReadStateEntry, Star};
pub use initial_data::InitialData;
pub use message::{
    ContentBlock, InlineNode, LinkKind, LinkNode, MentionKind, MentionNode, Message,
    MessageStatus, Reaction, TextNode,
};
pub use server::{ChannelSection, Server, ServerMember};
pub use user::{OnlineStatus, ProfilePicture, User};
