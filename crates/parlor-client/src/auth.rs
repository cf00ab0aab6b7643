//! Wallet-signature authentication and token lifecycle
//!
//! Sign-in exchanges a signed message for an access/refresh token pair.
//! Refresh is single-flight: concurrent requests that all hit a 401 funnel
//! through one refresh call, and the losers pick up the winner's new tokens
//! instead of burning the refresh token twice.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Access/refresh token pair as issued by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Wallet signature proof submitted at sign-in
#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub message: String,
    pub signature: String,
    pub address: String,
    pub signed_at: DateTime<Utc>,
    pub nonce: String,
}

/// Where the session's tokens live between runs
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Option<TokenPair>;
    async fn save(&self, tokens: TokenPair);
    async fn clear(&self);
}

/// Process-local token store
#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> Option<TokenPair> {
        self.tokens.read().clone()
    }

    async fn save(&self, tokens: TokenPair) {
        *self.tokens.write() = Some(tokens);
    }

    async fn clear(&self) {
        *self.tokens.write() = None;
    }
}

/// Authentication endpoints and the refresh single-flight
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, base_url: String, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            base_url,
            tokens,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Build the client from configuration, including the configured request
    /// timeout
    pub fn from_config(
        config: &ClientConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        Ok(Self::new(
            config.http_client()?,
            config.api_base_url.clone(),
            tokens,
        ))
    }

    /// Current access token, if signed in
    pub async fn access_token(&self) -> Option<String> {
        self.tokens.load().await.map(|t| t.access_token)
    }

    /// Exchange a wallet signature for a token pair
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<TokenPair, ApiError> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: response.text().await.ok(),
            });
        }

        let tokens: TokenPair = response.json().await?;
        self.tokens.save(tokens.clone()).await;
        info!(address = %request.address, "signed in");
        Ok(tokens)
    }

    /// Refresh the token pair after `stale_access_token` was rejected
    ///
    /// Returns the access token to retry with. If another task already
    /// refreshed while this one waited for the lock, its tokens are reused.
    pub async fn refresh(&self, stale_access_token: &str) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.tokens.load().await.ok_or(ApiError::NotSignedIn)?;
        if current.access_token != stale_access_token {
            return Ok(current.access_token);
        }

        let response = self
            .http
            .post(format!("{}/auth/refresh", self.base_url))
            .json(&serde_json::json!({ "refresh_token": current.refresh_token }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "token refresh rejected");
            self.tokens.clear().await;
            return Err(ApiError::SessionExpired);
        }

        let tokens: TokenPair = response.json().await?;
        let access = tokens.access_token.clone();
        self.tokens.save(tokens).await;
        Ok(access)
    }

    /// Drop the stored tokens and tell the backend to revoke them
    pub async fn sign_out(&self) {
        if let Some(tokens) = self.tokens.load().await {
            // Revocation failure is not actionable; the local session ends
            // either way.
            let result = self
                .http
                .post(format!("{}/auth/logout", self.base_url))
                .json(&serde_json::json!({ "refresh_token": tokens.refresh_token }))
                .send()
                .await;
            if let Err(error) = result {
                warn!(%error, "token revocation failed");
            }
        }
        self.tokens.clear().await;
    }
}
