//! # parlor-core
//!
//! Domain layer containing entities, value objects, store actions, and
//! realtime event translation. This crate performs no I/O.

pub mod actions;
pub mod entities;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use actions::{Action, ServerEvent, ServerEventError};
pub use entities::{
    Channel, ChannelKind, ChannelReadState, ChannelSection, ContentBlock, InitialData, InlineNode,
    Message, MessageStatus, OnlineStatus, ProfilePicture, Reaction, ReadStateEntry, Server,
    ServerMember, Star, TextNode, User,
};
pub use value_objects::{EntityId, PlaceholderIdAllocator};
