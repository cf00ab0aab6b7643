//! Server table - communities the signed-in user belongs to

use std::collections::HashMap;

use parlor_core::{Action, EntityId, Server, ServerEvent};

use super::Reduce;

/// Normalized server storage
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerTable {
    entries_by_id: HashMap<EntityId, Server>,
}

impl ServerTable {
    /// Look up a server by id
    pub fn get(&self, id: &EntityId) -> Option<&Server> {
        self.entries_by_id.get(id)
    }

    /// Iterate all servers
    pub fn entries(&self) -> impl Iterator<Item = &Server> {
        self.entries_by_id.values()
    }

    pub fn len(&self) -> usize {
        self.entries_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries_by_id.is_empty()
    }

    fn upsert(&mut self, server: &Server) -> bool {
        if self.entries_by_id.get(&server.id) == Some(server) {
            return false;
        }
        self.entries_by_id.insert(server.id.clone(), server.clone());
        true
    }

    fn patch(&mut self, id: &EntityId, apply: impl FnOnce(&mut Server)) -> bool {
        match self.entries_by_id.get_mut(id) {
            Some(server) => {
                let before = server.clone();
                apply(server);
                *server != before
            }
            None => false,
        }
    }
}

impl Reduce for ServerTable {
    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::InitialDataFetched { data } => {
                let mut next = Self::default();
                for server in &data.servers {
                    next.entries_by_id.insert(server.id.clone(), server.clone());
                }
                (next != *self).then_some(next)
            }

            Action::ServersFetched { servers } => {
                let mut next = self.clone();
                let mut changed = false;
                for server in servers {
                    changed |= next.upsert(server);
                }
                changed.then_some(next)
            }

            Action::ServerFetched { server } => {
                let mut next = self.clone();
                next.upsert(server).then_some(next)
            }

            Action::ServerEvent { event } => match event {
                ServerEvent::ServerProfileUpdated {
                    server_id,
                    name,
                    description,
                    avatar,
                } => {
                    let mut next = self.clone();
                    next.patch(server_id, |server| {
                        if let Some(name) = name {
                            server.name = name.clone();
                        }
                        if description.is_some() {
                            server.description = description.clone();
                        }
                        if avatar.is_some() {
                            server.avatar = avatar.clone();
                        }
                    })
                    .then_some(next)
                }
                ServerEvent::ServerMemberJoined {
                    server_id, member, ..
                } => {
                    let mut next = self.clone();
                    next.patch(server_id, |server| {
                        if server.member(&member.user_id).is_none() {
                            server.members.push(member.clone());
                        }
                    })
                    .then_some(next)
                }
                _ => None,
            },

            Action::Logout => (!self.is_empty()).then(Self::default),

            _ => None,
        }
    }
}
