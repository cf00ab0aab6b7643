//! Channel entity - a dm, standalone topic, or server channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::EntityId;

/// Channel kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    /// Direct message between a fixed member set
    Dm,
    /// Standalone topic channel, joinable outside any server
    #[default]
    Topic,
    /// Channel belonging to a server
    Server,
}

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: EntityId,
    pub kind: ChannelKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "owner", default)]
    pub owner_user_id: Option<EntityId>,
    #[serde(rename = "members", default)]
    pub member_user_ids: Vec<EntityId>,
    #[serde(rename = "server", default)]
    pub server_id: Option<EntityId>,
    #[serde(rename = "section", default)]
    pub section_id: Option<EntityId>,
}

impl Channel {
    /// Check if this is a dm channel
    #[inline]
    pub fn is_dm(&self) -> bool {
        matches!(self.kind, ChannelKind::Dm)
    }

    /// Check if this channel belongs to a server
    #[inline]
    pub fn is_server_channel(&self) -> bool {
        self.server_id.is_some()
    }

    /// Check if `user_id` is in the membership list
    pub fn has_member(&self, user_id: &EntityId) -> bool {
        self.member_user_ids.contains(user_id)
    }
}

/// Per-channel read tracking
///
/// `last_read_at` moves optimistically when the client acks a channel;
/// `last_message_at` follows message arrival from any source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChannelReadState {
    #[serde(default)]
    pub last_read_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
}

impl ChannelReadState {
    /// Whether the channel has messages newer than the last ack
    pub fn has_unread(&self) -> bool {
        match (self.last_read_at, self.last_message_at) {
            (Some(read), Some(message)) => message > read,
            (None, Some(_)) => true,
            _ => false,
        }
    }

    /// Advance `last_message_at`, never moving it backwards
    pub fn observe_message_at(&mut self, at: DateTime<Utc>) -> bool {
        if self.last_message_at.is_some_and(|current| current >= at) {
            return false;
        }
        self.last_message_at = Some(at);
        true
    }
}

/// Wire entry tying a read state to its channel (part of the `/ready` payload)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStateEntry {
    #[serde(rename = "channel")]
    pub channel_id: EntityId,
    #[serde(flatten)]
    pub state: ChannelReadState,
}

/// Starred-channel marker, independent of the channel lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {
    pub id: EntityId,
    #[serde(rename = "channel")]
    pub channel_id: EntityId,
}
