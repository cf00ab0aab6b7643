//! Session operations
//!
//! A `Session` ties the authorized API transport to the store: every
//! operation performs its request and describes the outcome as dispatched
//! actions. Optimistic operations dispatch a request-sent action up front and
//! either a succeeded action or a compensating failure action afterwards.

mod channels;
mod messages;
mod servers;
mod stars;

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use parlor_core::{Action, EntityId, InitialData, PlaceholderIdAllocator, ServerEvent, User};
use parlor_store::SharedStore;

use crate::api::{Api, HttpMethod};
use crate::auth::AuthClient;
use crate::error::ApiError;

pub use channels::{CreateChannelRequest, UpdateChannelRequest};
pub use messages::{FetchMessagesQuery, MessageDraft};
pub use servers::{CreateServerRequest, SectionDraft, UpdateServerRequest};

/// Minimum spacing between typing notifications for one channel
const TYPING_NOTIFY_INTERVAL: Duration = Duration::from_secs(3);

/// Profile fields editable by the signed-in user
#[derive(Debug, Clone, Default)]
pub struct UpdateMeRequest {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub pfp_image_url: Option<String>,
}

/// Authenticated session bound to one store
pub struct Session {
    api: Arc<dyn Api>,
    store: SharedStore,
    auth: Option<Arc<AuthClient>>,
    placeholder_ids: PlaceholderIdAllocator,
    typing_sent_at: DashMap<EntityId, Instant>,
}

impl Session {
    pub fn new(api: Arc<dyn Api>, store: SharedStore) -> Self {
        Self {
            api,
            store,
            auth: None,
            placeholder_ids: PlaceholderIdAllocator::new(),
            typing_sent_at: DashMap::new(),
        }
    }

    /// Attach the auth client so `logout` can revoke tokens
    #[must_use]
    pub fn with_auth(mut self, auth: Arc<AuthClient>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub(crate) fn api(&self) -> &Arc<dyn Api> {
        &self.api
    }

    pub(crate) fn placeholder_ids(&self) -> &PlaceholderIdAllocator {
        &self.placeholder_ids
    }

    pub(crate) fn dispatch(&self, action: &Action) {
        self.store.dispatch(action);
    }

    /// The signed-in user, once initial data has loaded
    pub(crate) fn me(&self) -> Result<User, ApiError> {
        self.store
            .state()
            .me
            .user()
            .cloned()
            .ok_or(ApiError::NotSignedIn)
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Load the signed-in user's complete starting state
    #[instrument(skip(self))]
    pub async fn fetch_initial_data(&self) -> Result<(), ApiError> {
        let payload = self.api.request(HttpMethod::Get, "/ready", None).await?;
        let data: InitialData = decode(payload)?;
        info!(
            users = data.users.len(),
            channels = data.channels.len(),
            servers = data.servers.len(),
            "initial data loaded"
        );
        self.dispatch(&Action::InitialDataFetched { data });
        Ok(())
    }

    /// Update the signed-in user's profile
    #[instrument(skip(self, request))]
    pub async fn update_me(&self, request: &UpdateMeRequest) -> Result<(), ApiError> {
        let me = self.me()?;
        let mut body = serde_json::Map::new();
        if let Some(name) = &request.display_name {
            body.insert("display_name".to_string(), json!(name));
        }
        if let Some(description) = &request.description {
            body.insert("description".to_string(), json!(description));
        }
        if let Some(url) = &request.pfp_image_url {
            body.insert("pfp".to_string(), json!({ "input_image_url": url }));
        }

        let payload = self
            .api
            .request(HttpMethod::Patch, "/users/me", Some(Value::Object(body)))
            .await?;
        let updated: User = decode(payload)?;
        self.dispatch(&Action::ServerEvent {
            event: ServerEvent::UserProfileUpdated {
                user_id: me.id,
                display_name: updated.display_name,
                description: updated.description,
                pfp: updated.pfp,
            },
        });
        Ok(())
    }

    /// Notify the channel that the signed-in user is typing
    ///
    /// Calls are throttled per channel; dropping a throttled call is fine
    /// because peers hold the indicator open for several seconds anyway.
    pub async fn register_typing_activity(&self, channel_id: &EntityId) -> Result<(), ApiError> {
        let now = Instant::now();
        let throttled = self
            .typing_sent_at
            .get(channel_id)
            .is_some_and(|sent| now.duration_since(*sent) < TYPING_NOTIFY_INTERVAL);
        if throttled {
            return Ok(());
        }
        self.typing_sent_at.insert(channel_id.clone(), now);

        self.api
            .request(
                HttpMethod::Post,
                &format!("/channels/{channel_id}/typing"),
                None,
            )
            .await?;
        Ok(())
    }

    /// End the session: revoke tokens (when an auth client is attached) and
    /// reset every table
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(auth) = &self.auth {
            auth.sign_out().await;
        }
        self.typing_sent_at.clear();
        self.dispatch(&Action::Logout);
        info!("session ended");
    }
}

/// Decode a JSON response body, treating an absent body as `null`
pub(crate) fn decode<T: DeserializeOwned>(payload: Option<Value>) -> Result<T, ApiError> {
    Ok(serde_json::from_value(payload.unwrap_or(Value::Null))?)
}

/// Log and swallow a failure from a fire-and-forget follow-up request
pub(crate) fn log_followup_error(what: &'static str, result: Result<(), ApiError>) {
    if let Err(error) = result {
        warn!(%error, what, "follow-up request failed");
    }
}
