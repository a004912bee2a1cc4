use std::collections::HashSet;

use sqlx::SqlitePool;

use super::prefs;
use crate::error::AppError;
use crate::models::user::UserRecord;

/// Users banned during the current session. Cleared on session exit.
pub const BANNED_USERS: &str = "banned_users";
/// Users flagged for the auto-ban sweep. Survives sessions.
pub const AUTOBAN_USERS: &str = "autoban_users";
/// The operator-maintained blacklist roster.
pub const BLACKLIST: &str = "blacklist";
/// Users observed in the monitored channel this session, in arrival order.
pub const JOIN_HISTORY: &str = "join_history";

const REASON_PREFIX: &str = "reason:";

// Rosters are sets of ids in memory; the space-delimited encoding exists only
// at the store boundary.
fn decode_roster(raw: &str) -> HashSet<String> {
    raw.split_whitespace().map(|s| s.to_string()).collect()
}

fn encode_roster(ids: &HashSet<String>) -> String {
    let mut ids: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
    ids.sort_unstable();
    ids.join(" ")
}

pub async fn roster(pool: &SqlitePool, key: &str) -> Result<HashSet<String>, AppError> {
    let raw = prefs::get(pool, key).await?;
    Ok(raw.as_deref().map(decode_roster).unwrap_or_default())
}

pub async fn put_roster(
    pool: &SqlitePool,
    key: &str,
    ids: &HashSet<String>,
) -> Result<(), AppError> {
    if ids.is_empty() {
        prefs::remove(pool, key).await
    } else {
        prefs::set(pool, key, &encode_roster(ids)).await
    }
}

pub async fn add_to_roster(
    pool: &SqlitePool,
    key: &str,
    ids: &[String],
) -> Result<(), AppError> {
    let mut current = roster(pool, key).await?;
    current.extend(ids.iter().cloned());
    put_roster(pool, key, &current).await
}

pub async fn remove_from_roster(
    pool: &SqlitePool,
    key: &str,
    ids: &[String],
) -> Result<(), AppError> {
    let mut current = roster(pool, key).await?;
    for id in ids {
        current.remove(id);
    }
    put_roster(pool, key, &current).await
}

fn reason_key(user_id: &str) -> String {
    format!("{REASON_PREFIX}{user_id}")
}

pub async fn reason(pool: &SqlitePool, user_id: &str) -> Result<Option<String>, AppError> {
    prefs::get(pool, &reason_key(user_id)).await
}

pub async fn set_reason(pool: &SqlitePool, user_id: &str, reason: &str) -> Result<(), AppError> {
    prefs::set(pool, &reason_key(user_id), reason).await
}

pub async fn remove_reason(pool: &SqlitePool, user_id: &str) -> Result<(), AppError> {
    prefs::remove(pool, &reason_key(user_id)).await
}

pub async fn history(pool: &SqlitePool) -> Result<Vec<UserRecord>, AppError> {
    match prefs::get(pool, JOIN_HISTORY).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|e| AppError::Internal(format!("corrupt join history: {e}"))),
        None => Ok(Vec::new()),
    }
}

pub async fn put_history(pool: &SqlitePool, records: &[UserRecord]) -> Result<(), AppError> {
    if records.is_empty() {
        return prefs::remove(pool, JOIN_HISTORY).await;
    }
    let raw = serde_json::to_string(records)
        .map_err(|e| AppError::Internal(format!("encoding join history: {e}")))?;
    prefs::set(pool, JOIN_HISTORY, &raw).await
}

/// Drop the given users from the join history. A user is pruned the moment
/// they become banned or blacklisted.
pub async fn prune_history(pool: &SqlitePool, ids: &HashSet<String>) -> Result<(), AppError> {
    let mut records = history(pool).await?;
    let before = records.len();
    records.retain(|r| !ids.contains(&r.id));
    if records.len() != before {
        put_history(pool, &records).await?;
    }
    Ok(())
}

/// Session teardown: the banned roster and join history are session state,
/// the auto-ban roster is operator configuration and stays.
pub async fn clear_session(pool: &SqlitePool) -> Result<(), AppError> {
    prefs::remove(pool, BANNED_USERS).await?;
    prefs::remove(pool, JOIN_HISTORY).await?;
    Ok(())
}
