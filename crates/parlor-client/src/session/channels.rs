//! Channel operations: CRUD, membership, read state, visibility

use chrono::Utc;
use serde_json::json;
use tracing::instrument;

use parlor_core::{Action, Channel, ChannelKind, EntityId};

use crate::api::HttpMethod;
use crate::error::ApiError;
use crate::session::{decode, Session};

/// Fields for creating a channel
#[derive(Debug, Clone, Default)]
pub struct CreateChannelRequest {
    pub kind: ChannelKind,
    pub name: Option<String>,
    pub description: Option<String>,
    pub member_user_ids: Vec<EntityId>,
    pub server_id: Option<EntityId>,
    pub section_id: Option<EntityId>,
}

/// Fields editable on an existing channel
#[derive(Debug, Clone, Default)]
pub struct UpdateChannelRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Session {
    /// Fetch one channel by id
    #[instrument(skip(self), fields(channel = %channel_id))]
    pub async fn fetch_channel(&self, channel_id: &EntityId) -> Result<Channel, ApiError> {
        let payload = self
            .api()
            .request(HttpMethod::Get, &format!("/channels/{channel_id}"), None)
            .await?;
        let channel: Channel = decode(payload)?;
        self.dispatch(&Action::ChannelFetched {
            channel: channel.clone(),
        });
        Ok(channel)
    }

    /// Create a channel
    #[instrument(skip(self, request))]
    pub async fn create_channel(
        &self,
        request: &CreateChannelRequest,
    ) -> Result<Channel, ApiError> {
        let mut body = serde_json::Map::new();
        body.insert("kind".to_string(), json!(request.kind));
        if let Some(name) = &request.name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(description) = &request.description {
            body.insert("description".to_string(), json!(description));
        }
        if !request.member_user_ids.is_empty() {
            body.insert("members".to_string(), json!(request.member_user_ids));
        }
        if let Some(server_id) = &request.server_id {
            body.insert("server".to_string(), json!(server_id));
        }
        if let Some(section_id) = &request.section_id {
            body.insert("section".to_string(), json!(section_id));
        }

        let payload = self
            .api()
            .request(HttpMethod::Post, "/channels", Some(body.into()))
            .await?;
        let channel: Channel = decode(payload)?;
        self.dispatch(&Action::ChannelFetched {
            channel: channel.clone(),
        });
        Ok(channel)
    }

    /// Open (or find) the direct-message channel with `member_user_ids`
    #[instrument(skip(self, member_user_ids))]
    pub async fn create_dm_channel(
        &self,
        member_user_ids: Vec<EntityId>,
    ) -> Result<Channel, ApiError> {
        self.create_channel(&CreateChannelRequest {
            kind: ChannelKind::Dm,
            member_user_ids,
            ..Default::default()
        })
        .await
    }

    /// Create a channel inside a server section
    #[instrument(skip(self), fields(server = %server_id))]
    pub async fn create_server_channel(
        &self,
        server_id: &EntityId,
        section_id: Option<&EntityId>,
        name: &str,
    ) -> Result<Channel, ApiError> {
        self.create_channel(&CreateChannelRequest {
            kind: ChannelKind::Server,
            name: Some(name.to_string()),
            server_id: Some(server_id.clone()),
            section_id: section_id.cloned(),
            ..Default::default()
        })
        .await
    }

    /// Update a channel's name or description
    #[instrument(skip(self, request), fields(channel = %channel_id))]
    pub async fn update_channel(
        &self,
        channel_id: &EntityId,
        request: &UpdateChannelRequest,
    ) -> Result<(), ApiError> {
        let mut body = serde_json::Map::new();
        if let Some(name) = &request.name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(description) = &request.description {
            body.insert("description".to_string(), json!(description));
        }

        let payload = self
            .api()
            .request(
                HttpMethod::Patch,
                &format!("/channels/{channel_id}"),
                Some(body.into()),
            )
            .await?;
        let channel: Channel = decode(payload)?;
        self.dispatch(&Action::ChannelFetched { channel });
        Ok(())
    }

    /// Delete a channel and drop its local state
    #[instrument(skip(self), fields(channel = %channel_id))]
    pub async fn delete_channel(&self, channel_id: &EntityId) -> Result<(), ApiError> {
        self.api()
            .request(HttpMethod::Delete, &format!("/channels/{channel_id}"), None)
            .await?;
        self.dispatch(&Action::ChannelDeleted {
            channel_id: channel_id.clone(),
        });
        Ok(())
    }

    /// Record that the signed-in user has read the channel up to now
    ///
    /// The read state is advanced locally before the request settles; a lost
    /// request only means the unread badge comes back on the next cold load.
    pub async fn mark_channel_read(&self, channel_id: &EntityId) -> Result<(), ApiError> {
        let read_at = Utc::now();
        self.dispatch(&Action::MarkChannelReadRequestSent {
            channel_id: channel_id.clone(),
            read_at,
        });
        self.api()
            .request(
                HttpMethod::Post,
                &format!("/channels/{channel_id}/ack"),
                Some(json!({ "read_at": read_at })),
            )
            .await?;
        Ok(())
    }

    /// Add a member to a channel
    #[instrument(skip(self), fields(channel = %channel_id, user = %user_id))]
    pub async fn add_channel_member(
        &self,
        channel_id: &EntityId,
        user_id: &EntityId,
    ) -> Result<(), ApiError> {
        self.api()
            .request(
                HttpMethod::Put,
                &format!("/channels/{channel_id}/members/{user_id}"),
                None,
            )
            .await?;
        self.fetch_channel(channel_id).await?;
        Ok(())
    }

    /// Remove a member from a channel
    #[instrument(skip(self), fields(channel = %channel_id, user = %user_id))]
    pub async fn remove_channel_member(
        &self,
        channel_id: &EntityId,
        user_id: &EntityId,
    ) -> Result<(), ApiError> {
        self.api()
            .request(
                HttpMethod::Delete,
                &format!("/channels/{channel_id}/members/{user_id}"),
                None,
            )
            .await?;
        self.fetch_channel(channel_id).await?;
        Ok(())
    }

    /// Join a public channel as the signed-in user
    #[instrument(skip(self), fields(channel = %channel_id))]
    pub async fn join_channel(&self, channel_id: &EntityId) -> Result<(), ApiError> {
        self.api()
            .request(
                HttpMethod::Post,
                &format!("/channels/{channel_id}/join"),
                None,
            )
            .await?;
        self.fetch_channel(channel_id).await?;
        Ok(())
    }

    /// Leave a channel; the channel itself survives for its other members
    #[instrument(skip(self), fields(channel = %channel_id))]
    pub async fn leave_channel(&self, channel_id: &EntityId) -> Result<(), ApiError> {
        self.api()
            .request(
                HttpMethod::Post,
                &format!("/channels/{channel_id}/leave"),
                None,
            )
            .await?;
        self.dispatch(&Action::ChannelDeleted {
            channel_id: channel_id.clone(),
        });
        Ok(())
    }

    /// Open a channel to everyone
    ///
    /// Visibility changes ripple through permissions the backend computes, so
    /// the whole starting state is refetched instead of patched locally.
    #[instrument(skip(self), fields(channel = %channel_id))]
    pub async fn make_channel_public(&self, channel_id: &EntityId) -> Result<(), ApiError> {
        self.api()
            .request(
                HttpMethod::Post,
                &format!("/channels/{channel_id}/public"),
                None,
            )
            .await?;
        self.fetch_initial_data().await
    }

    /// Restrict a channel to its member list
    #[instrument(skip(self), fields(channel = %channel_id))]
    pub async fn make_channel_private(&self, channel_id: &EntityId) -> Result<(), ApiError> {
        self.api()
            .request(
                HttpMethod::Post,
                &format!("/channels/{channel_id}/private"),
                None,
            )
            .await?;
        self.fetch_initial_data().await
    }
}
