//! Server entity - a community grouping channels into ordered sections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::ProfilePicture;
use crate::value_objects::EntityId;

/// Server entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(rename = "owner", default)]
    pub owner_user_id: Option<EntityId>,
    /// Section order and the channel order inside each section are
    /// user-editable and meaningful
    #[serde(default)]
    pub sections: Vec<ChannelSection>,
    #[serde(default)]
    pub members: Vec<ServerMember>,
}

impl Server {
    /// Check if `user_id` owns this server
    pub fn is_owned_by(&self, user_id: &EntityId) -> bool {
        self.owner_user_id.as_ref() == Some(user_id)
    }

    /// Look up a member profile by user id
    pub fn member(&self, user_id: &EntityId) -> Option<&ServerMember> {
        self.members.iter().find(|m| &m.user_id == user_id)
    }

    /// Channel ids across all sections, in section order
    pub fn channel_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.sections.iter().flat_map(|s| s.channel_ids.iter())
    }
}

/// Ordered group of channels inside a server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSection {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "channels", default)]
    pub channel_ids: Vec<EntityId>,
}

/// Per-server member profile; overrides the plain user profile inside the
/// server's channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMember {
    #[serde(rename = "user")]
    pub user_id: EntityId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub pfp: Option<ProfilePicture>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}
