//! Client error types

use thiserror::Error;

/// Failure of an API operation
#[derive(Debug, Error)]
pub enum ApiError {
    /// No access token available; the caller must sign in first
    #[error("not signed in")]
    NotSignedIn,

    /// The refresh token was rejected; the session is over
    #[error("session expired")]
    SessionExpired,

    /// Non-success HTTP status from the backend
    #[error("request failed with status {status}")]
    Http {
        status: u16,
        message: Option<String>,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid emoji: {0:?}")]
    InvalidEmoji(String),

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
}

impl ApiError {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error is a 404 from the backend
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
