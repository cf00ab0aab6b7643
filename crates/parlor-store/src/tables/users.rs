//! User table - every account the client has seen

use std::collections::HashMap;

use parlor_core::{Action, EntityId, ServerEvent, User};

use super::Reduce;

/// Normalized user storage, keyed by id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserTable {
    entries_by_id: HashMap<EntityId, User>,
}

impl UserTable {
    /// Look up a user by id
    pub fn get(&self, id: &EntityId) -> Option<&User> {
        self.entries_by_id.get(id)
    }

    /// Look up a user by wallet address (linear scan; the table is small)
    pub fn get_by_wallet_address(&self, address: &str) -> Option<&User> {
        self.entries_by_id
            .values()
            .find(|u| u.wallet_address.eq_ignore_ascii_case(address))
    }

    /// Iterate all users
    pub fn entries(&self) -> impl Iterator<Item = &User> {
        self.entries_by_id.values()
    }

    pub fn len(&self) -> usize {
        self.entries_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries_by_id.is_empty()
    }

    fn upsert(&mut self, user: &User) -> bool {
        if self.entries_by_id.get(&user.id) == Some(user) {
            return false;
        }
        self.entries_by_id.insert(user.id.clone(), user.clone());
        true
    }

    fn patch(&mut self, id: &EntityId, apply: impl FnOnce(&mut User)) -> bool {
        match self.entries_by_id.get_mut(id) {
            Some(user) => {
                let before = user.clone();
                apply(user);
                *user != before
            }
            None => false,
        }
    }
}

impl Reduce for UserTable {
    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::InitialDataFetched { data } => {
                let mut next = Self::default();
                next.entries_by_id
                    .insert(data.user.id.clone(), data.user.clone());
                for user in &data.users {
                    next.entries_by_id.insert(user.id.clone(), user.clone());
                }
                (next != *self).then_some(next)
            }

            Action::ServerEvent { event } => match event {
                ServerEvent::UserProfileUpdated {
                    user_id,
                    display_name,
                    description,
                    pfp,
                } => {
                    let mut next = self.clone();
                    next.patch(user_id, |user| {
                        if display_name.is_some() {
                            user.display_name = display_name.clone();
                        }
                        if description.is_some() {
                            user.description = description.clone();
                        }
                        if pfp.is_some() {
                            user.pfp = pfp.clone();
                        }
                    })
                    .then_some(next)
                }
                ServerEvent::UserPresenceUpdated { user_id, status } => {
                    let mut next = self.clone();
                    next.patch(user_id, |user| user.status = *status)
                        .then_some(next)
                }
                ServerEvent::ServerMemberJoined { user, .. } => {
                    let mut next = self.clone();
                    next.upsert(user).then_some(next)
                }
                _ => None,
            },

            Action::Logout => (!self.is_empty()).then(Self::default),

            _ => None,
        }
    }
}
