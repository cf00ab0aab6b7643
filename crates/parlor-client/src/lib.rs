//! # parlor-client
//!
//! Session layer over the store: wallet-signature authentication with
//! single-flight token refresh, an authorized request transport that retries
//! once through a 401, store-dispatching operations for every API surface,
//! and a realtime bridge with derived typing-ended events.

pub mod api;
pub mod auth;
pub mod config;
pub mod emoji;
pub mod error;
pub mod realtime;
pub mod session;
pub mod telemetry;

pub use api::{Api, HttpApi, HttpMethod};
pub use auth::{AuthClient, InMemoryTokenStore, SignInRequest, TokenPair, TokenStore};
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use realtime::RealtimeBridge;
pub use session::{
    CreateChannelRequest, CreateServerRequest, FetchMessagesQuery, MessageDraft, SectionDraft,
    Session, UpdateChannelRequest, UpdateMeRequest, UpdateServerRequest,
};
