pub mod client;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::HostClient;

#[derive(Debug)]
pub enum HostError {
    Http(reqwest::Error),
    Api { status: u16, body: String },
    NoSession,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Http(e) => write!(f, "HTTP error: {e}"),
            HostError::Api { status, body } => {
                write!(f, "host returned {status}: {body}")
            }
            HostError::NoSession => write!(f, "no host session established"),
        }
    }
}

impl From<reqwest::Error> for HostError {
    fn from(e: reqwest::Error) -> Self {
        HostError::Http(e)
    }
}

/// A user profile as the host client knows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedUser {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub avatar_url: String,
}

/// Everything the moderation core needs from the host chat client: profile
/// lookup, voice-channel occupancy, the operator's own identity, and the ban
/// command.
#[async_trait]
pub trait HostGateway: Send + Sync {
    /// Resolve a user id to a profile. `Ok(None)` means the host does not
    /// know the user.
    async fn resolve_user(&self, user_id: &str) -> Result<Option<ResolvedUser>, HostError>;

    /// Ids of the users currently in a voice channel, in directory order.
    async fn list_occupants(&self, channel_id: &str) -> Result<Vec<String>, HostError>;

    /// The operator's own user id. Fails with `NoSession` when the host has
    /// no established session.
    async fn current_operator_id(&self) -> Result<String, HostError>;

    /// Submit one ban command covering all given users.
    async fn submit_ban(&self, user_ids: &[String], space_id: &str) -> Result<(), HostError>;
}
