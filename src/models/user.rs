use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::host::ResolvedUser;

/// A user observed in the monitored channel. `first_seen_at` is set when the
/// user is first recorded and is never updated on later sightings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub avatar_url: String,
    pub first_seen_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn from_resolved(user: ResolvedUser, first_seen_at: DateTime<Utc>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            global_name: user.global_name,
            avatar_url: user.avatar_url,
            first_seen_at,
        }
    }
}
