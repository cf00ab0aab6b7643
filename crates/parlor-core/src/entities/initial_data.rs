//! Initial session payload delivered by `GET /ready`

use serde::{Deserialize, Serialize};

use crate::entities::{Channel, ReadStateEntry, Server, User};

/// Everything the client needs to hydrate the store after login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InitialData {
    pub user: User,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub read_states: Vec<ReadStateEntry>,
}
