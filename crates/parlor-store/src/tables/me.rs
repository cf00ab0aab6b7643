//! Signed-in user table

use parlor_core::{Action, ServerEvent, User};

use super::Reduce;

/// The account this client is signed in as, once initial data has loaded
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeTable {
    user: Option<User>,
}

impl MeTable {
    /// The signed-in user, or `None` before initial data / after logout
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

impl Reduce for MeTable {
    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::InitialDataFetched { data } => {
                if self.user.as_ref() == Some(&data.user) {
                    return None;
                }
                Some(Self {
                    user: Some(data.user.clone()),
                })
            }

            // Own profile and presence follow the same realtime events as
            // everyone else's
            Action::ServerEvent {
                event:
                    ServerEvent::UserProfileUpdated {
                        user_id,
                        display_name,
                        description,
                        pfp,
                    },
            } => {
                let me = self.user.as_ref().filter(|u| &u.id == user_id)?;
                let mut updated = me.clone();
                if display_name.is_some() {
                    updated.display_name = display_name.clone();
                }
                if description.is_some() {
                    updated.description = description.clone();
                }
                if pfp.is_some() {
                    updated.pfp = pfp.clone();
                }
                (updated != *me).then(|| Self {
                    user: Some(updated),
                })
            }

            Action::ServerEvent {
                event: ServerEvent::UserPresenceUpdated { user_id, status },
            } => {
                let me = self.user.as_ref().filter(|u| &u.id == user_id)?;
                if me.status == *status {
                    return None;
                }
                let mut updated = me.clone();
                updated.status = *status;
                Some(Self {
                    user: Some(updated),
                })
            }

            Action::Logout => self.user.is_some().then(Self::default),

            _ => None,
        }
    }
}
