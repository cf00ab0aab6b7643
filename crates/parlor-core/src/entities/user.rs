//! User entity - represents an account known to the client

use serde::{Deserialize, Serialize};

use crate::value_objects::EntityId;

/// Online status as reported by presence events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OnlineStatus {
    Online,
    #[default]
    Offline,
}

/// Profile picture descriptor as delivered by the backend
///
/// `cf_image_url` is the CDN copy when one exists; `input_image_url` is the
/// original upload. `verified` marks an on-chain verified NFT picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfilePicture {
    #[serde(default)]
    pub input_image_url: Option<String>,
    #[serde(default)]
    pub cf_image_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

impl ProfilePicture {
    /// Best available image URL (CDN copy preferred)
    pub fn url(&self) -> Option<&str> {
        self.cf_image_url
            .as_deref()
            .or(self.input_image_url.as_deref())
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct User {
    pub id: EntityId,
    #[serde(default)]
    pub display_name: Option<String>,
    pub wallet_address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: OnlineStatus,
    #[serde(default)]
    pub pfp: Option<ProfilePicture>,
}

impl User {
    /// Name to show in the UI, falling back to the wallet address
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.wallet_address)
    }
}
