//! Authorized API transport
//!
//! `Api` is the seam between session operations and HTTP: operations speak in
//! `(method, path, body)` and get back optional JSON. The live implementation
//! attaches the bearer token and transparently retries exactly once through a
//! token refresh when the backend answers 401.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::auth::AuthClient;
use crate::config::ClientConfig;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Authenticated request transport
#[async_trait]
pub trait Api: Send + Sync {
    /// Perform an authorized request; `Ok(None)` means an empty (204) body
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError>;
}

/// Live HTTP transport over `reqwest`
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<AuthClient>,
}

impl HttpApi {
    pub fn new(http: reqwest::Client, base_url: String, auth: Arc<AuthClient>) -> Self {
        Self {
            http,
            base_url,
            auth,
        }
    }

    /// Build the live transport from configuration, including the configured
    /// request timeout
    pub fn from_config(config: &ClientConfig, auth: Arc<AuthClient>) -> Result<Self, ApiError> {
        Ok(Self::new(
            config.http_client()?,
            config.api_base_url.clone(),
            auth,
        ))
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        access_token: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self
            .http
            .request(method.as_reqwest(), format!("{}{path}", self.base_url))
            .bearer_auth(access_token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn decode(response: reqwest::Response) -> Result<Option<Value>, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: response.text().await.ok(),
            });
        }
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let text = response.text().await?;
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }
}

#[async_trait]
impl Api for HttpApi {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        let access_token = self
            .auth
            .access_token()
            .await
            .ok_or(ApiError::NotSignedIn)?;

        let response = self.send(method, path, body.as_ref(), &access_token).await?;
        if response.status() != reqwest::StatusCode::UNAUTHORIZED {
            return Self::decode(response).await;
        }

        // One refresh, one retry. A second 401 means the new token is no
        // good either and the session is done.
        debug!(path, "access token rejected, refreshing");
        let fresh_token = self.auth.refresh(&access_token).await?;
        let response = self.send(method, path, body.as_ref(), &fresh_token).await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::SessionExpired);
        }
        Self::decode(response).await
    }
}
