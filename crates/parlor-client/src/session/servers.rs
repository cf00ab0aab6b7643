//! Server operations: CRUD, membership, section layout

use serde_json::json;
use tracing::instrument;

use parlor_core::{Action, EntityId, Server};

use crate::api::HttpMethod;
use crate::error::ApiError;
use crate::session::{decode, Session};

/// Fields for creating a server
#[derive(Debug, Clone, Default)]
pub struct CreateServerRequest {
    pub name: String,
    pub description: Option<String>,
    pub avatar: Option<String>,
}

/// Fields editable on an existing server
#[derive(Debug, Clone, Default)]
pub struct UpdateServerRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
}

/// A section's name and channel order, for layout edits
#[derive(Debug, Clone)]
pub struct SectionDraft {
    pub name: String,
    pub channel_ids: Vec<EntityId>,
}

impl Session {
    /// Fetch every server the signed-in user belongs to
    #[instrument(skip(self))]
    pub async fn fetch_servers(&self) -> Result<(), ApiError> {
        let payload = self.api().request(HttpMethod::Get, "/servers", None).await?;
        let servers: Vec<Server> = decode(payload)?;
        self.dispatch(&Action::ServersFetched { servers });
        Ok(())
    }

    /// Fetch one server by id
    #[instrument(skip(self), fields(server = %server_id))]
    pub async fn fetch_server(&self, server_id: &EntityId) -> Result<(), ApiError> {
        let payload = self
            .api()
            .request(HttpMethod::Get, &format!("/servers/{server_id}"), None)
            .await?;
        let server: Server = decode(payload)?;
        self.dispatch(&Action::ServerFetched { server });
        Ok(())
    }

    /// Create a server; the creator becomes owner and first member
    #[instrument(skip(self, request))]
    pub async fn create_server(&self, request: &CreateServerRequest) -> Result<Server, ApiError> {
        let mut body = serde_json::Map::new();
        body.insert("name".to_string(), json!(request.name));
        if let Some(description) = &request.description {
            body.insert("description".to_string(), json!(description));
        }
        if let Some(avatar) = &request.avatar {
            body.insert("avatar".to_string(), json!(avatar));
        }

        let payload = self
            .api()
            .request(HttpMethod::Post, "/servers", Some(body.into()))
            .await?;
        let server: Server = decode(payload)?;
        self.dispatch(&Action::ServerFetched {
            server: server.clone(),
        });
        Ok(server)
    }

    /// Update a server's profile
    #[instrument(skip(self, request), fields(server = %server_id))]
    pub async fn update_server(
        &self,
        server_id: &EntityId,
        request: &UpdateServerRequest,
    ) -> Result<(), ApiError> {
        let mut body = serde_json::Map::new();
        if let Some(name) = &request.name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(description) = &request.description {
            body.insert("description".to_string(), json!(description));
        }
        if let Some(avatar) = &request.avatar {
            body.insert("avatar".to_string(), json!(avatar));
        }

        let payload = self
            .api()
            .request(
                HttpMethod::Patch,
                &format!("/servers/{server_id}"),
                Some(body.into()),
            )
            .await?;
        let server: Server = decode(payload)?;
        self.dispatch(&Action::ServerFetched { server });
        Ok(())
    }

    /// Join a server by invite code; the joined server comes back resolved
    #[instrument(skip(self))]
    pub async fn join_server(&self, invite_code: &str) -> Result<Server, ApiError> {
        let payload = self
            .api()
            .request(
                HttpMethod::Post,
                "/servers/join",
                Some(json!({ "code": invite_code })),
            )
            .await?;
        let server: Server = decode(payload)?;
        self.dispatch(&Action::ServerFetched {
            server: server.clone(),
        });
        // Joining grants channels the starting state did not include
        self.fetch_initial_data().await?;
        Ok(server)
    }

    /// Create a section in a server's channel layout
    #[instrument(skip(self, draft), fields(server = %server_id))]
    pub async fn create_server_section(
        &self,
        server_id: &EntityId,
        draft: &SectionDraft,
    ) -> Result<(), ApiError> {
        self.api()
            .request(
                HttpMethod::Post,
                &format!("/servers/{server_id}/sections"),
                Some(json!({ "name": draft.name, "channels": draft.channel_ids })),
            )
            .await?;
        self.fetch_server(server_id).await
    }

    /// Rename a section or reorder the channels inside it
    #[instrument(skip(self, draft), fields(server = %server_id, section = %section_id))]
    pub async fn update_server_section(
        &self,
        server_id: &EntityId,
        section_id: &EntityId,
        draft: &SectionDraft,
    ) -> Result<(), ApiError> {
        self.api()
            .request(
                HttpMethod::Patch,
                &format!("/servers/{server_id}/sections/{section_id}"),
                Some(json!({ "name": draft.name, "channels": draft.channel_ids })),
            )
            .await?;
        self.fetch_server(server_id).await
    }

    /// Delete a section; its channels fall back to the server's default list
    #[instrument(skip(self), fields(server = %server_id, section = %section_id))]
    pub async fn delete_server_section(
        &self,
        server_id: &EntityId,
        section_id: &EntityId,
    ) -> Result<(), ApiError> {
        self.api()
            .request(
                HttpMethod::Delete,
                &format!("/servers/{server_id}/sections/{section_id}"),
                None,
            )
            .await?;
        self.fetch_server(server_id).await
    }
}
