//! Realtime server events
//!
//! The realtime transport delivers `(event name, payload)` pairs; this module
//! translates them into typed events the reducers can match on. Reaction
//! events are carried as individual `(message, emoji, user)` deltas rather
//! than whole-message snapshots, so they can be applied at-most-once against
//! optimistic local state.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::entities::{Message, OnlineStatus, ProfilePicture, ServerMember, User};
use crate::value_objects::EntityId;

/// Typed realtime event
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    MessageCreated {
        message: Message,
    },
    MessageUpdated {
        message: Message,
    },
    MessageRemoved {
        message_id: EntityId,
        channel_id: EntityId,
    },
    MessageReactionAdded {
        message_id: EntityId,
        emoji: String,
        user_id: EntityId,
    },
    MessageReactionRemoved {
        message_id: EntityId,
        emoji: String,
        user_id: EntityId,
    },
    UserProfileUpdated {
        user_id: EntityId,
        display_name: Option<String>,
        description: Option<String>,
        pfp: Option<ProfilePicture>,
    },
    UserPresenceUpdated {
        user_id: EntityId,
        status: OnlineStatus,
    },
    ServerProfileUpdated {
        server_id: EntityId,
        name: Option<String>,
        description: Option<String>,
        avatar: Option<String>,
    },
    ServerMemberJoined {
        server_id: EntityId,
        user: User,
        member: ServerMember,
    },
    UserTyped {
        channel_id: EntityId,
        user_id: EntityId,
    },
}

/// Failure translating a wire event
#[derive(Debug, Error)]
pub enum ServerEventError {
    #[error("unknown realtime event: {0}")]
    UnknownEvent(String),

    #[error("invalid payload for {event}: {source}")]
    InvalidPayload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ServerEvent {
    /// Translate a wire `(name, payload)` pair into a typed event
    pub fn from_wire(name: &str, data: Value) -> Result<Self, ServerEventError> {
        match name {
            "MESSAGE_CREATE" => {
                let p: MessagePayload = decode("MESSAGE_CREATE", data)?;
                Ok(Self::MessageCreated { message: p.message })
            }
            "MESSAGE_UPDATE" => {
                let p: MessagePayload = decode("MESSAGE_UPDATE", data)?;
                Ok(Self::MessageUpdated { message: p.message })
            }
            "MESSAGE_REMOVE" => {
                let p: MessageRefPayload = decode("MESSAGE_REMOVE", data)?;
                Ok(Self::MessageRemoved {
                    message_id: p.message.id,
                    channel_id: p.message.channel_id,
                })
            }
            "MESSAGE_REACTION_ADD" => {
                let p: ReactionPayload = decode("MESSAGE_REACTION_ADD", data)?;
                Ok(Self::MessageReactionAdded {
                    message_id: p.message.id,
                    emoji: p.emoji,
                    user_id: p.user,
                })
            }
            "MESSAGE_REACTION_REMOVE" => {
                let p: ReactionPayload = decode("MESSAGE_REACTION_REMOVE", data)?;
                Ok(Self::MessageReactionRemoved {
                    message_id: p.message.id,
                    emoji: p.emoji,
                    user_id: p.user,
                })
            }
            "USER_PROFILE_UPDATE" => {
                let p: UserProfilePayload = decode("USER_PROFILE_UPDATE", data)?;
                Ok(Self::UserProfileUpdated {
                    user_id: p.user,
                    display_name: p.display_name,
                    description: p.description,
                    pfp: p.pfp,
                })
            }
            "USER_PRESENCE_UPDATE" => {
                let p: PresencePayload = decode("USER_PRESENCE_UPDATE", data)?;
                Ok(Self::UserPresenceUpdated {
                    user_id: p.user.id,
                    status: p.user.status,
                })
            }
            "SERVER_PROFILE_UPDATE" => {
                let p: ServerProfilePayload = decode("SERVER_PROFILE_UPDATE", data)?;
                Ok(Self::ServerProfileUpdated {
                    server_id: p.server,
                    name: p.name,
                    description: p.description,
                    avatar: p.avatar,
                })
            }
            "SERVER_MEMBER_JOINED" => {
                let p: MemberJoinedPayload = decode("SERVER_MEMBER_JOINED", data)?;
                let member = p.member.unwrap_or(ServerMember {
                    user_id: p.user.id.clone(),
                    display_name: None,
                    pfp: None,
                    joined_at: None,
                });
                Ok(Self::ServerMemberJoined {
                    server_id: p.server,
                    user: p.user,
                    member,
                })
            }
            "USER_TYPING" => {
                let p: TypingPayload = decode("USER_TYPING", data)?;
                Ok(Self::UserTyped {
                    channel_id: p.channel.id,
                    user_id: p.user.id,
                })
            }
            other => Err(ServerEventError::UnknownEvent(other.to_string())),
        }
    }

    /// Get the event kind name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessageCreated { .. } => "server-event:message-created",
            Self::MessageUpdated { .. } => "server-event:message-updated",
            Self::MessageRemoved { .. } => "server-event:message-removed",
            Self::MessageReactionAdded { .. } => "server-event:message-reaction-added",
            Self::MessageReactionRemoved { .. } => "server-event:message-reaction-removed",
            Self::UserProfileUpdated { .. } => "server-event:user-profile-updated",
            Self::UserPresenceUpdated { .. } => "server-event:user-presence-updated",
            Self::ServerProfileUpdated { .. } => "server-event:server-profile-updated",
            Self::ServerMemberJoined { .. } => "server-event:server-member-joined",
            Self::UserTyped { .. } => "server-event:user-typed",
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(
    event: &'static str,
    data: Value,
) -> Result<T, ServerEventError> {
    serde_json::from_value(data).map_err(|source| ServerEventError::InvalidPayload { event, source })
}

// ============================================================================
// Wire payload shapes
// ============================================================================

#[derive(Deserialize)]
struct MessagePayload {
    message: Message,
}

#[derive(Deserialize)]
struct MessageRef {
    id: EntityId,
    #[serde(rename = "channel")]
    channel_id: EntityId,
}

#[derive(Deserialize)]
struct MessageRefPayload {
    message: MessageRef,
}

#[derive(Deserialize)]
struct ReactionPayload {
    message: MessageRef,
    emoji: String,
    user: EntityId,
}

#[derive(Deserialize)]
struct UserProfilePayload {
    user: EntityId,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    pfp: Option<ProfilePicture>,
}

#[derive(Deserialize)]
struct PresenceRef {
    id: EntityId,
    #[serde(default)]
    status: OnlineStatus,
}

#[derive(Deserialize)]
struct PresencePayload {
    user: PresenceRef,
}

#[derive(Deserialize)]
struct ServerProfilePayload {
    server: EntityId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

#[derive(Deserialize)]
struct MemberJoinedPayload {
    server: EntityId,
    user: User,
    #[serde(default)]
    member: Option<ServerMember>,
}

#[derive(Deserialize)]
struct ChannelRef {
    id: EntityId,
}

#[derive(Deserialize)]
struct UserRef {
    id: EntityId,
}

#[derive(Deserialize)]
struct TypingPayload {
    channel: ChannelRef,
    user: UserRef,
}
