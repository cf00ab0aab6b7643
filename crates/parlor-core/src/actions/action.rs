//! Store actions - every state change is described by one of these records
//!
//! Actions are the sole mutation interface to the store: user-triggered
//! operations, request completions, and realtime pushes all funnel into this
//! one closed enum so reducers can be matched exhaustively.

use chrono::{DateTime, Utc};

use crate::actions::ServerEvent;
use crate::entities::{Channel, InitialData, Message, Server, Star};
use crate::value_objects::EntityId;

/// All possible store actions
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // =========================================================================
    // Session
    // =========================================================================
    InitialDataFetched {
        data: InitialData,
    },
    Logout,

    // =========================================================================
    // Messages
    // =========================================================================
    /// Result of a paginated channel fetch; the cursor fields determine which
    /// end of the per-channel index the batch merges into
    MessagesFetched {
        channel_id: EntityId,
        limit: u32,
        before_message_id: Option<EntityId>,
        after_message_id: Option<EntityId>,
        messages: Vec<Message>,
    },
    /// A single message fetched out of band (reply targets, permalinks)
    MessageFetched {
        message: Message,
    },
    MessageCreateRequestSent {
        message: Message,
    },
    MessageCreateRequestSucceeded {
        message: Message,
        optimistic_entry_id: EntityId,
    },
    MessageCreateRequestFailed {
        channel_id: EntityId,
        optimistic_entry_id: EntityId,
    },
    MessageUpdateRequestSucceeded {
        message: Message,
    },
    MessageDeleteRequestSucceeded {
        message_id: EntityId,
    },

    // =========================================================================
    // Reactions
    // =========================================================================
    AddMessageReactionRequestSent {
        message_id: EntityId,
        emoji: String,
        user_id: EntityId,
    },
    /// Compensates the optimistic add when the request rejects
    AddMessageReactionRequestFailed {
        message_id: EntityId,
        emoji: String,
        user_id: EntityId,
    },
    RemoveMessageReactionRequestSent {
        message_id: EntityId,
        emoji: String,
        user_id: EntityId,
    },
    /// Compensates the optimistic remove when the request rejects
    RemoveMessageReactionRequestFailed {
        message_id: EntityId,
        emoji: String,
        user_id: EntityId,
    },

    // =========================================================================
    // Channels
    // =========================================================================
    ChannelFetched {
        channel: Channel,
    },
    ChannelDeleted {
        channel_id: EntityId,
    },
    MarkChannelReadRequestSent {
        channel_id: EntityId,
        read_at: DateTime<Utc>,
    },

    // =========================================================================
    // Servers
    // =========================================================================
    ServersFetched {
        servers: Vec<Server>,
    },
    ServerFetched {
        server: Server,
    },

    // =========================================================================
    // Stars
    // =========================================================================
    StarredChannelsFetched {
        stars: Vec<Star>,
    },
    ChannelStarred {
        star: Star,
    },
    ChannelUnstarred {
        channel_id: EntityId,
    },

    // =========================================================================
    // Realtime
    // =========================================================================
    ServerEvent {
        event: ServerEvent,
    },
    /// Derived locally after a `(channel, user)` pair has been silent for the
    /// typing timeout window
    UserTypingEnded {
        channel_id: EntityId,
        user_id: EntityId,
    },
}

impl Action {
    /// Get the action kind name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitialDataFetched { .. } => "initial-data-fetched",
            Self::Logout => "logout",
            Self::MessagesFetched { .. } => "messages-fetched",
            Self::MessageFetched { .. } => "message-fetched",
            Self::MessageCreateRequestSent { .. } => "message-create-request-sent",
            Self::MessageCreateRequestSucceeded { .. } => "message-create-request-succeeded",
            Self::MessageCreateRequestFailed { .. } => "message-create-request-failed",
            Self::MessageUpdateRequestSucceeded { .. } => "message-update-request-succeeded",
            Self::MessageDeleteRequestSucceeded { .. } => "message-delete-request-succeeded",
            Self::AddMessageReactionRequestSent { .. } => "add-message-reaction:request-sent",
            Self::AddMessageReactionRequestFailed { .. } => "add-message-reaction:request-failed",
            Self::RemoveMessageReactionRequestSent { .. } => "remove-message-reaction:request-sent",
            Self::RemoveMessageReactionRequestFailed { .. } => {
                "remove-message-reaction:request-failed"
            }
            Self::ChannelFetched { .. } => "channel-fetched",
            Self::ChannelDeleted { .. } => "channel-deleted",
            Self::MarkChannelReadRequestSent { .. } => "mark-channel-read-request-sent",
            Self::ServersFetched { .. } => "servers-fetched",
            Self::ServerFetched { .. } => "server-fetched",
            Self::StarredChannelsFetched { .. } => "starred-channels-fetched",
            Self::ChannelStarred { .. } => "channel-starred",
            Self::ChannelUnstarred { .. } => "channel-unstarred",
            Self::ServerEvent { event } => event.kind(),
            Self::UserTypingEnded { .. } => "user-typing-ended",
        }
    }
}
