//! Message table and the messages-by-channel index
//!
//! The entity map and the per-channel id index are kept in one table so a
//! single reduction can update both: any id present in the index resolves in
//! the entity map after every action. Entity entries without an index entry
//! are allowed (fetched reply targets live only in the entity map).

use std::collections::{HashMap, HashSet};

use parlor_core::{Action, EntityId, Message, MessageStatus, ServerEvent};

use super::Reduce;

/// Normalized message storage
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageTable {
    entries_by_id: HashMap<EntityId, Message>,
    entry_ids_by_channel_id: HashMap<EntityId, Vec<EntityId>>,
}

impl MessageTable {
    /// Look up a message by id
    pub fn get(&self, id: &EntityId) -> Option<&Message> {
        self.entries_by_id.get(id)
    }

    /// Check if a message id is present
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entries_by_id.contains_key(id)
    }

    /// Ordered message ids for a channel
    pub fn channel_message_ids(&self, channel_id: &EntityId) -> &[EntityId] {
        self.entry_ids_by_channel_id
            .get(channel_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Iterate all stored messages
    pub fn entries(&self) -> impl Iterator<Item = &Message> {
        self.entries_by_id.values()
    }

    /// Iterate the per-channel index
    pub fn index(&self) -> impl Iterator<Item = (&EntityId, &[EntityId])> {
        self.entry_ids_by_channel_id
            .iter()
            .map(|(channel_id, ids)| (channel_id, ids.as_slice()))
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.entries_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries_by_id.is_empty()
    }

    fn upsert(&mut self, message: &Message) -> bool {
        if self.entries_by_id.get(&message.id) == Some(message) {
            return false;
        }
        self.entries_by_id
            .insert(message.id.clone(), message.clone());
        true
    }

    fn index_append(&mut self, channel_id: &EntityId, id: &EntityId) -> bool {
        let ids = self
            .entry_ids_by_channel_id
            .entry(channel_id.clone())
            .or_default();
        if ids.contains(id) {
            return false;
        }
        ids.push(id.clone());
        true
    }

    /// Remove a message from the entity map and every index list in one step
    fn remove(&mut self, id: &EntityId) -> bool {
        let mut changed = self.entries_by_id.remove(id).is_some();
        for ids in self.entry_ids_by_channel_id.values_mut() {
            let before = ids.len();
            ids.retain(|entry_id| entry_id != id);
            changed |= ids.len() != before;
        }
        changed
    }

    fn remove_channel(&mut self, channel_id: &EntityId) -> bool {
        let mut changed = self.entry_ids_by_channel_id.remove(channel_id).is_some();
        // Entity-only entries (fetched reply targets) belong to the channel
        // too, so the entity map is filtered rather than walked via the index
        let before = self.entries_by_id.len();
        self.entries_by_id
            .retain(|_, entry| &entry.channel_id != channel_id);
        changed |= self.entries_by_id.len() != before;
        changed
    }

    fn with_message_mut(
        &mut self,
        id: &EntityId,
        f: impl FnOnce(&mut Message) -> bool,
    ) -> bool {
        self.entries_by_id.get_mut(id).is_some_and(f)
    }
}

/// De-duplicating ordered union: `head` first, then ids of `tail` not already
/// seen, preserving relative order on both sides
fn merge_unique(head: Vec<EntityId>, tail: impl IntoIterator<Item = EntityId>) -> Vec<EntityId> {
    let mut seen: HashSet<EntityId> = head.iter().cloned().collect();
    let mut merged = head;
    for id in tail {
        if seen.insert(id.clone()) {
            merged.push(id);
        }
    }
    merged
}

impl Reduce for MessageTable {
    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::MessagesFetched {
                channel_id,
                before_message_id,
                messages,
                ..
            } => {
                if messages.is_empty() {
                    return None;
                }
                let mut next = self.clone();
                let mut changed = false;

                let mut fetched_ids_by_channel: HashMap<&EntityId, Vec<EntityId>> = HashMap::new();
                for message in messages {
                    changed |= next.upsert(message);
                    fetched_ids_by_channel
                        .entry(&message.channel_id)
                        .or_default()
                        .push(message.id.clone());
                }

                for (fetched_channel_id, fetched_ids) in fetched_ids_by_channel {
                    let existing = next
                        .entry_ids_by_channel_id
                        .remove(fetched_channel_id)
                        .unwrap_or_default();
                    // A `before` cursor pages backwards: the batch belongs in
                    // front of what is already loaded
                    let prepend =
                        fetched_channel_id == channel_id && before_message_id.is_some();
                    let merged = if prepend {
                        merge_unique(fetched_ids, existing.clone())
                    } else {
                        merge_unique(existing.clone(), fetched_ids)
                    };
                    changed |= merged != existing;
                    next.entry_ids_by_channel_id
                        .insert(fetched_channel_id.clone(), merged);
                }

                changed.then_some(next)
            }

            Action::MessageFetched { message }
            | Action::MessageUpdateRequestSucceeded { message } => {
                let mut next = self.clone();
                next.upsert(message).then_some(next)
            }

            Action::MessageCreateRequestSent { message } => {
                let mut next = self.clone();
                let mut changed = next.upsert(message);
                changed |= next.index_append(&message.channel_id, &message.id);
                changed.then_some(next)
            }

            Action::MessageCreateRequestSucceeded {
                message,
                optimistic_entry_id,
            } => {
                // Placeholder removal and confirmed insertion happen in the
                // same reduction; no state with both or neither is observable
                let mut next = self.clone();
                let mut changed = next.remove(optimistic_entry_id);
                changed |= next.upsert(message);
                changed |= next.index_append(&message.channel_id, &message.id);
                changed.then_some(next)
            }

            Action::MessageCreateRequestFailed {
                optimistic_entry_id,
                ..
            } => {
                // The failed placeholder is retained and flagged so the UI
                // can offer a retry
                let mut next = self.clone();
                next.with_message_mut(optimistic_entry_id, |entry| {
                    if entry.status == MessageStatus::FailedSend {
                        return false;
                    }
                    entry.status = MessageStatus::FailedSend;
                    true
                })
                .then_some(next)
            }

            Action::MessageDeleteRequestSucceeded { message_id } => {
                let mut next = self.clone();
                next.remove(message_id).then_some(next)
            }

            Action::AddMessageReactionRequestSent {
                message_id,
                emoji,
                user_id,
            }
            | Action::RemoveMessageReactionRequestFailed {
                message_id,
                emoji,
                user_id,
            } => {
                let mut next = self.clone();
                next.with_message_mut(message_id, |entry| {
                    entry.apply_reaction_added(emoji, user_id)
                })
                .then_some(next)
            }

            Action::RemoveMessageReactionRequestSent {
                message_id,
                emoji,
                user_id,
            }
            | Action::AddMessageReactionRequestFailed {
                message_id,
                emoji,
                user_id,
            } => {
                let mut next = self.clone();
                next.with_message_mut(message_id, |entry| {
                    entry.apply_reaction_removed(emoji, user_id)
                })
                .then_some(next)
            }

            Action::ChannelDeleted { channel_id } => {
                let mut next = self.clone();
                next.remove_channel(channel_id).then_some(next)
            }

            Action::ServerEvent { event } => self.reduce_server_event(event),

            Action::Logout => (!self.is_empty()).then(Self::default),

            _ => None,
        }
    }
}

impl MessageTable {
    fn reduce_server_event(&self, event: &ServerEvent) -> Option<Self> {
        match event {
            ServerEvent::MessageCreated { message } => {
                let mut next = self.clone();
                let mut changed = next.upsert(message);
                changed |= next.index_append(&message.channel_id, &message.id);
                changed.then_some(next)
            }
            ServerEvent::MessageUpdated { message } => {
                let mut next = self.clone();
                next.upsert(message).then_some(next)
            }
            ServerEvent::MessageRemoved { message_id, .. } => {
                let mut next = self.clone();
                next.remove(message_id).then_some(next)
            }
            ServerEvent::MessageReactionAdded {
                message_id,
                emoji,
                user_id,
            } => {
                let mut next = self.clone();
                next.with_message_mut(message_id, |entry| {
                    entry.apply_reaction_added(emoji, user_id)
                })
                .then_some(next)
            }
            ServerEvent::MessageReactionRemoved {
                message_id,
                emoji,
                user_id,
            } => {
                let mut next = self.clone();
                next.with_message_mut(message_id, |entry| {
                    entry.apply_reaction_removed(emoji, user_id)
                })
                .then_some(next)
            }
            _ => None,
        }
    }
}
