//! Channel table, per-channel read states, and typing presence

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parlor_core::{Action, Channel, ChannelReadState, EntityId, Message, ServerEvent};

use super::Reduce;

/// Normalized channel storage
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelTable {
    entries_by_id: HashMap<EntityId, Channel>,
    read_states_by_channel_id: HashMap<EntityId, ChannelReadState>,
    typing_user_ids_by_channel_id: HashMap<EntityId, Vec<EntityId>>,
}

impl ChannelTable {
    /// Look up a channel by id
    pub fn get(&self, id: &EntityId) -> Option<&Channel> {
        self.entries_by_id.get(id)
    }

    /// Read state for a channel, if any has been recorded
    pub fn read_state(&self, channel_id: &EntityId) -> Option<&ChannelReadState> {
        self.read_states_by_channel_id.get(channel_id)
    }

    /// Users currently typing in a channel
    pub fn typing_user_ids(&self, channel_id: &EntityId) -> &[EntityId] {
        self.typing_user_ids_by_channel_id
            .get(channel_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Iterate all channels
    pub fn entries(&self) -> impl Iterator<Item = &Channel> {
        self.entries_by_id.values()
    }

    pub fn len(&self) -> usize {
        self.entries_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries_by_id.is_empty()
            && self.read_states_by_channel_id.is_empty()
            && self.typing_user_ids_by_channel_id.is_empty()
    }

    fn upsert(&mut self, channel: &Channel) -> bool {
        if self.entries_by_id.get(&channel.id) == Some(channel) {
            return false;
        }
        self.entries_by_id
            .insert(channel.id.clone(), channel.clone());
        true
    }

    fn observe_message(&mut self, channel_id: &EntityId, at: DateTime<Utc>) -> bool {
        self.read_states_by_channel_id
            .entry(channel_id.clone())
            .or_default()
            .observe_message_at(at)
    }

    fn clear_typing(&mut self, channel_id: &EntityId, user_id: &EntityId) -> bool {
        match self.typing_user_ids_by_channel_id.get_mut(channel_id) {
            Some(ids) => {
                let before = ids.len();
                ids.retain(|id| id != user_id);
                let changed = ids.len() != before;
                if ids.is_empty() {
                    self.typing_user_ids_by_channel_id.remove(channel_id);
                }
                changed
            }
            None => false,
        }
    }
}

fn latest_created_at(messages: &[Message]) -> Option<DateTime<Utc>> {
    messages.iter().map(|m| m.created_at).max()
}

impl Reduce for ChannelTable {
    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::InitialDataFetched { data } => {
                let mut next = Self::default();
                for channel in &data.channels {
                    next.entries_by_id
                        .insert(channel.id.clone(), channel.clone());
                }
                for entry in &data.read_states {
                    next.read_states_by_channel_id
                        .insert(entry.channel_id.clone(), entry.state.clone());
                }
                (next != *self).then_some(next)
            }

            Action::ChannelFetched { channel } => {
                let mut next = self.clone();
                next.upsert(channel).then_some(next)
            }

            Action::ChannelDeleted { channel_id } => {
                let mut next = self.clone();
                let mut changed = next.entries_by_id.remove(channel_id).is_some();
                changed |= next.read_states_by_channel_id.remove(channel_id).is_some();
                changed |= next
                    .typing_user_ids_by_channel_id
                    .remove(channel_id)
                    .is_some();
                changed.then_some(next)
            }

            Action::MarkChannelReadRequestSent {
                channel_id,
                read_at,
            } => {
                let mut next = self.clone();
                let state = next
                    .read_states_by_channel_id
                    .entry(channel_id.clone())
                    .or_default();
                if state.last_read_at == Some(*read_at) {
                    return None;
                }
                state.last_read_at = Some(*read_at);
                Some(next)
            }

            Action::MessagesFetched {
                channel_id,
                messages,
                ..
            } => {
                let at = latest_created_at(messages)?;
                let mut next = self.clone();
                next.observe_message(channel_id, at).then_some(next)
            }

            Action::MessageCreateRequestSent { message }
            | Action::MessageCreateRequestSucceeded { message, .. } => {
                let mut next = self.clone();
                next.observe_message(&message.channel_id, message.created_at)
                    .then_some(next)
            }

            Action::ServerEvent { event } => match event {
                ServerEvent::MessageCreated { message } => {
                    let mut next = self.clone();
                    let mut changed =
                        next.observe_message(&message.channel_id, message.created_at);
                    // A delivered message ends its author's typing indicator
                    changed |= next.clear_typing(&message.channel_id, &message.author_id);
                    changed.then_some(next)
                }
                ServerEvent::UserTyped {
                    channel_id,
                    user_id,
                } => {
                    let mut next = self.clone();
                    let ids = next
                        .typing_user_ids_by_channel_id
                        .entry(channel_id.clone())
                        .or_default();
                    if ids.contains(user_id) {
                        return None;
                    }
                    ids.push(user_id.clone());
                    Some(next)
                }
                _ => None,
            },

            Action::UserTypingEnded {
                channel_id,
                user_id,
            } => {
                let mut next = self.clone();
                next.clear_typing(channel_id, user_id).then_some(next)
            }

            Action::Logout => (!self.is_empty()).then(Self::default),

            _ => None,
        }
    }
}
