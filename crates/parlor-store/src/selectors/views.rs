//! Denormalized read models
//!
//! Views join an entity with everything the UI needs to render it: resolved
//! author profiles, normalized content blocks, reaction state relative to the
//! signed-in user, and the replied-to message one level deep.

use chrono::{DateTime, Utc};
use parlor_core::{ContentBlock, EntityId, Message, MessageStatus, OnlineStatus, ProfilePicture};

use crate::state::AppState;

/// A user as rendered inside a channel, with server-member profile overrides
/// already applied
#[derive(Debug, Clone, PartialEq)]
pub struct UserView {
    pub id: EntityId,
    pub name: String,
    pub pfp: Option<ProfilePicture>,
    pub status: OnlineStatus,
}

impl UserView {
    /// Resolve a user for display in `server_id` (when given), letting the
    /// per-server member profile shadow the account profile
    pub fn resolve(state: &AppState, user_id: &EntityId, server_id: Option<&EntityId>) -> Option<Self> {
        let user = state.users.get(user_id)?;
        let member = server_id
            .and_then(|id| state.servers.get(id))
            .and_then(|server| server.member(user_id));

        let name = member
            .and_then(|m| m.display_name.as_deref())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| user.name())
            .to_string();
        let pfp = member
            .and_then(|m| m.pfp.clone())
            .or_else(|| user.pfp.clone());

        Some(Self {
            id: user.id.clone(),
            name,
            pfp,
            status: user.status,
        })
    }

}

/// One reaction row with the signed-in user's participation resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionView {
    pub emoji: String,
    pub count: u32,
    pub user_ids: Vec<EntityId>,
    pub has_reacted: bool,
}

/// A message joined with its author, reactions, and (one level of) the
/// message it replies to
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub id: EntityId,
    pub channel_id: EntityId,
    pub author: Option<UserView>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub blocks: Vec<ContentBlock>,
    pub reactions: Vec<ReactionView>,
    pub replied_message: Option<Box<MessageView>>,
    pub deleted: bool,
    pub status: MessageStatus,
}

impl MessageView {
    /// Build the view for `message`, resolving the reply target one level
    /// deep (the reply's own reply is not resolved)
    pub fn build(state: &AppState, message: &Message) -> Self {
        let replied_message = message
            .reply_to
            .as_ref()
            .and_then(|id| state.messages.get(id))
            .map(|replied| Box::new(Self::build_shallow(state, replied)));
        let mut view = Self::build_shallow(state, message);
        view.replied_message = replied_message;
        view
    }

    fn build_shallow(state: &AppState, message: &Message) -> Self {
        let me_id = state.me.user().map(|u| &u.id);
        let reactions = message
            .reactions
            .iter()
            .map(|r| ReactionView {
                emoji: r.emoji.clone(),
                count: r.count,
                user_ids: r.users.clone(),
                has_reacted: me_id.is_some_and(|id| r.has_user(id)),
            })
            .collect();

        Self {
            id: message.id.clone(),
            channel_id: message.channel_id.clone(),
            author: UserView::resolve(state, &message.author_id, message.server_id.as_ref()),
            created_at: message.created_at,
            edited_at: message.edited_at,
            blocks: message.content_blocks(),
            reactions,
            replied_message: None,
            deleted: message.deleted,
            status: message.status,
        }
    }
}
