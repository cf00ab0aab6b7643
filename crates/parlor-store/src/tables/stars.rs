//! Starred-channel table

use std::collections::HashMap;

use parlor_core::{Action, EntityId, Star};

use super::Reduce;

/// Stars keyed by star id, with the channel id as the practical lookup key
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StarTable {
    entries_by_id: HashMap<EntityId, Star>,
}

impl StarTable {
    /// Look up the star id attached to a channel, if the channel is starred
    pub fn star_id_for_channel(&self, channel_id: &EntityId) -> Option<&EntityId> {
        self.entries_by_id
            .values()
            .find(|s| &s.channel_id == channel_id)
            .map(|s| &s.id)
    }

    /// Check whether a channel is starred
    pub fn contains_channel(&self, channel_id: &EntityId) -> bool {
        self.star_id_for_channel(channel_id).is_some()
    }

    /// Iterate all stars
    pub fn entries(&self) -> impl Iterator<Item = &Star> {
        self.entries_by_id.values()
    }

    pub fn len(&self) -> usize {
        self.entries_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries_by_id.is_empty()
    }
}

impl Reduce for StarTable {
    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::StarredChannelsFetched { stars } => {
                let mut next = Self::default();
                for star in stars {
                    next.entries_by_id.insert(star.id.clone(), star.clone());
                }
                (next != *self).then_some(next)
            }

            Action::ChannelStarred { star } => {
                if self.entries_by_id.get(&star.id) == Some(star) {
                    return None;
                }
                let mut next = self.clone();
                next.entries_by_id.insert(star.id.clone(), star.clone());
                Some(next)
            }

            Action::ChannelUnstarred { channel_id } => {
                let star_id = self.star_id_for_channel(channel_id)?.clone();
                let mut next = self.clone();
                next.entries_by_id.remove(&star_id);
                Some(next)
            }

            // Stars intentionally survive ChannelDeleted: the backend owns
            // star cleanup and a stale star renders as an unresolvable entry.
            Action::Logout => (!self.is_empty()).then(Self::default),

            _ => None,
        }
    }
}
