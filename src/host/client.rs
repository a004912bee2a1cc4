use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{HostError, HostGateway, ResolvedUser};
use crate::nonce;

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    username: String,
    global_name: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OccupantPayload {
    user_id: String,
}

/// HTTP client for the host chat client's local API. Resolved profiles are
/// cached for the lifetime of the client; avatar and name changes are not
/// tracked mid-session.
pub struct HostClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    users: DashMap<String, ResolvedUser>,
}

impl HostClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            auth_token: None,
            users: DashMap::new(),
        }
    }

    pub fn with_auth_token(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref token) = self.auth_token {
            builder.header("Authorization", token.clone())
        } else {
            builder
        }
    }
}

#[async_trait]
impl HostGateway for HostClient {
    async fn resolve_user(&self, user_id: &str) -> Result<Option<ResolvedUser>, HostError> {
        if let Some(user) = self.users.get(user_id) {
            return Ok(Some(user.clone()));
        }

        let url = format!("{}/api/v1/users/{user_id}", self.base_url);
        let resp = self.apply_auth(self.client.get(&url)).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(HostError::Api { status, body });
        }

        let payload: UserPayload = resp.json().await?;
        let user = ResolvedUser {
            id: payload.id,
            username: payload.username,
            global_name: payload.global_name,
            avatar_url: payload.avatar_url.unwrap_or_default(),
        };
        self.users.insert(user_id.to_string(), user.clone());
        Ok(Some(user))
    }

    async fn list_occupants(&self, channel_id: &str) -> Result<Vec<String>, HostError> {
        let url = format!("{}/api/v1/channels/{channel_id}/voice-states", self.base_url);
        let resp = self.apply_auth(self.client.get(&url)).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(HostError::Api { status, body });
        }

        let occupants: Vec<OccupantPayload> = resp.json().await?;
        Ok(occupants.into_iter().map(|o| o.user_id).collect())
    }

    async fn current_operator_id(&self) -> Result<String, HostError> {
        let url = format!("{}/api/v1/users/@me", self.base_url);
        let resp = self.apply_auth(self.client.get(&url)).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(HostError::NoSession);
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(HostError::Api { status, body });
        }

        let payload: UserPayload = resp.json().await?;
        Ok(payload.id)
    }

    async fn submit_ban(&self, user_ids: &[String], space_id: &str) -> Result<(), HostError> {
        let url = format!("{}/api/v1/interactions", self.base_url);
        let builder = self.apply_auth(self.client.post(&url)).json(&json!({
            "space_id": space_id,
            "command": "ban",
            "targets": user_ids.join(" "),
            "nonce": nonce::generate(),
        }));
        let resp = builder.send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(HostError::Api { status, body });
        }
        Ok(())
    }
}
