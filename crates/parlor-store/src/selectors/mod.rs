//! Memoized read-side queries
//!
//! Selectors join the normalized tables into the shapes the UI renders.
//! Expensive joins (message views and per-channel message lists) are
//! memoized; cache keys carry the addresses of the input table `Arc`s, so a
//! dispatch that rebuilt a table automatically misses and everything else
//! still hits.

mod memo;
mod views;

pub use views::{MessageView, ReactionView, UserView};

use std::sync::Arc;

use parlor_core::{Channel, EntityId, Server, ServerMember, Star, User};

use crate::state::AppState;
use memo::Memo;

const MESSAGE_VIEW_CAPACITY: usize = 4096;
const CHANNEL_LIST_CAPACITY: usize = 64;

fn addr<T>(arc: &Arc<T>) -> usize {
    Arc::as_ptr(arc) as usize
}

/// Key covering every table a message view reads from, plus the id being
/// asked for (a message id, or a channel id for list selectors)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MessageViewKey {
    messages: usize,
    users: usize,
    servers: usize,
    me: usize,
    entity_id: EntityId,
}

impl MessageViewKey {
    fn new(state: &AppState, entity_id: &EntityId) -> Self {
        Self {
            messages: addr(&state.messages),
            users: addr(&state.users),
            servers: addr(&state.servers),
            me: addr(&state.me),
            entity_id: entity_id.clone(),
        }
    }
}

/// Memoized selector caches; one instance lives inside the store
pub struct Selectors {
    message_views: Memo<MessageViewKey, Arc<MessageView>>,
    channel_messages: Memo<MessageViewKey, Arc<Vec<Arc<MessageView>>>>,
}

impl Default for Selectors {
    fn default() -> Self {
        Self::new()
    }
}

impl Selectors {
    pub fn new() -> Self {
        Self {
            message_views: Memo::new(MESSAGE_VIEW_CAPACITY),
            channel_messages: Memo::new(CHANNEL_LIST_CAPACITY),
        }
    }

    // ========================================================================
    // Me / users
    // ========================================================================

    pub fn me<'a>(&self, state: &'a AppState) -> Option<&'a User> {
        state.me.user()
    }

    pub fn user<'a>(&self, state: &'a AppState, user_id: &EntityId) -> Option<&'a User> {
        state.users.get(user_id)
    }

    pub fn user_by_wallet_address<'a>(
        &self,
        state: &'a AppState,
        address: &str,
    ) -> Option<&'a User> {
        state.users.get_by_wallet_address(address)
    }

    /// Resolve a user for display, applying server-member overrides when a
    /// server context is given
    pub fn user_view(
        &self,
        state: &AppState,
        user_id: &EntityId,
        server_id: Option<&EntityId>,
    ) -> Option<UserView> {
        UserView::resolve(state, user_id, server_id)
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Fully resolved view of one message
    pub fn message_view(&self, state: &AppState, message_id: &EntityId) -> Option<Arc<MessageView>> {
        let key = MessageViewKey::new(state, message_id);
        if let Some(hit) = self.message_views.get(&key) {
            return Some(hit);
        }
        let message = state.messages.get(message_id)?;
        let view = Arc::new(MessageView::build(state, message));
        self.message_views.insert(key, Arc::clone(&view));
        Some(view)
    }

    /// Every message of a channel, in stored (chronological) order
    pub fn channel_messages(
        &self,
        state: &AppState,
        channel_id: &EntityId,
    ) -> Arc<Vec<Arc<MessageView>>> {
        let key = MessageViewKey::new(state, channel_id);
        if let Some(hit) = self.channel_messages.get(&key) {
            return hit;
        }
        let views = state
            .messages
            .channel_message_ids(channel_id)
            .iter()
            .filter_map(|id| self.message_view(state, id))
            .collect();
        let views = Arc::new(views);
        self.channel_messages.insert(key, Arc::clone(&views));
        views
    }

    // ========================================================================
    // Channels
    // ========================================================================

    pub fn channel<'a>(&self, state: &'a AppState, channel_id: &EntityId) -> Option<&'a Channel> {
        state.channels.get(channel_id)
    }

    pub fn channel_has_unread(&self, state: &AppState, channel_id: &EntityId) -> bool {
        state
            .channels
            .read_state(channel_id)
            .is_some_and(|rs| rs.has_unread())
    }

    /// Users currently typing in a channel, excluding the signed-in user
    pub fn channel_typing_users(&self, state: &AppState, channel_id: &EntityId) -> Vec<UserView> {
        let me_id = state.me.user().map(|u| &u.id);
        let server_id = state
            .channels
            .get(channel_id)
            .and_then(|c| c.server_id.as_ref());
        state
            .channels
            .typing_user_ids(channel_id)
            .iter()
            .filter(|id| Some(*id) != me_id)
            .filter_map(|id| UserView::resolve(state, id, server_id))
            .collect()
    }

    // ========================================================================
    // Stars
    // ========================================================================

    pub fn channel_star_id<'a>(
        &self,
        state: &'a AppState,
        channel_id: &EntityId,
    ) -> Option<&'a EntityId> {
        state.stars.star_id_for_channel(channel_id)
    }

    pub fn is_channel_starred(&self, state: &AppState, channel_id: &EntityId) -> bool {
        state.stars.contains_channel(channel_id)
    }

    /// Starred channels that still resolve to a known channel
    pub fn starred_channels<'a>(&self, state: &'a AppState) -> Vec<(&'a Star, &'a Channel)> {
        state
            .stars
            .entries()
            .filter_map(|star| state.channels.get(&star.channel_id).map(|c| (star, c)))
            .collect()
    }

    // ========================================================================
    // Servers
    // ========================================================================

    pub fn server<'a>(&self, state: &'a AppState, server_id: &EntityId) -> Option<&'a Server> {
        state.servers.get(server_id)
    }

    /// Per-server member profile, when the user has one
    pub fn server_member<'a>(
        &self,
        state: &'a AppState,
        server_id: &EntityId,
        user_id: &EntityId,
    ) -> Option<&'a ServerMember> {
        state.servers.get(server_id)?.member(user_id)
    }

    /// A server's channels in section order, skipping ids the channel table
    /// has not resolved yet
    pub fn server_channels<'a>(
        &self,
        state: &'a AppState,
        server_id: &EntityId,
    ) -> Vec<&'a Channel> {
        state
            .servers
            .get(server_id)
            .map(|server| {
                server
                    .channel_ids()
                    .filter_map(|id| state.channels.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }
}
