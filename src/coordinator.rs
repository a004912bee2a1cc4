use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::db::rosters;
use crate::error::AppError;
use crate::host::{HostGateway, ResolvedUser};
use crate::models::user::UserRecord;
use crate::models::view::{status_label, BlacklistEntryView, ToggleAction, ToggleOutcome};

/// Toggle a user's blacklist membership.
///
/// Unblacklisting also deletes the stored reason and drops the user from the
/// auto-ban roster; blacklisting stores the reason if one is given and prunes
/// the user from the join history. Callers toggling several users get
/// independent per-id results, not a batch.
pub async fn toggle_blacklist(
    pool: &SqlitePool,
    user_id: &str,
    reason: Option<&str>,
) -> Result<ToggleOutcome, AppError> {
    let mut blacklist = rosters::roster(pool, rosters::BLACKLIST).await?;

    if blacklist.remove(user_id) {
        rosters::put_roster(pool, rosters::BLACKLIST, &blacklist).await?;
        rosters::remove_reason(pool, user_id).await?;
        rosters::remove_from_roster(pool, rosters::AUTOBAN_USERS, &[user_id.to_string()])
            .await?;
        tracing::info!(%user_id, "unblacklisted");
        Ok(ToggleOutcome {
            action: ToggleAction::Unblacklist,
            user_id: user_id.to_string(),
        })
    } else {
        blacklist.insert(user_id.to_string());
        rosters::put_roster(pool, rosters::BLACKLIST, &blacklist).await?;
        if let Some(reason) = reason {
            rosters::set_reason(pool, user_id, reason).await?;
        }
        rosters::prune_history(pool, &HashSet::from([user_id.to_string()])).await?;
        tracing::info!(%user_id, "blacklisted");
        Ok(ToggleOutcome {
            action: ToggleAction::Blacklist,
            user_id: user_id.to_string(),
        })
    }
}

/// Bulk auto-ban toggle with the selection-level tie-break: if any of the
/// given users is already flagged, the whole selection is unflagged,
/// otherwise the whole selection is flagged. Returns the resulting roster.
pub async fn toggle_auto_ban(
    pool: &SqlitePool,
    user_ids: &[String],
) -> Result<HashSet<String>, AppError> {
    let mut flagged = rosters::roster(pool, rosters::AUTOBAN_USERS).await?;
    let any_flagged = user_ids.iter().any(|id| flagged.contains(id));

    if any_flagged {
        for id in user_ids {
            flagged.remove(id);
        }
        tracing::info!(count = user_ids.len(), "auto-ban flags removed");
    } else {
        flagged.extend(user_ids.iter().cloned());
        tracing::info!(count = user_ids.len(), "auto-ban flags added");
    }
    rosters::put_roster(pool, rosters::AUTOBAN_USERS, &flagged).await?;
    Ok(flagged)
}

/// Set the blacklist reason for each given user: already-blacklisted users
/// get their reason overwritten, the rest are blacklisted with that reason.
pub async fn set_reasons(
    pool: &SqlitePool,
    user_ids: &[String],
    reason: &str,
) -> Result<(), AppError> {
    for user_id in user_ids {
        let blacklist = rosters::roster(pool, rosters::BLACKLIST).await?;
        if blacklist.contains(user_id) {
            rosters::set_reason(pool, user_id, reason).await?;
        } else {
            toggle_blacklist(pool, user_id, Some(reason)).await?;
        }
    }
    Ok(())
}

/// Submit one ban covering all given users. On success they are recorded as
/// banned and pruned from the join history; a failed submission is logged and
/// dropped without retry.
pub async fn request_ban(
    pool: &SqlitePool,
    host: &dyn HostGateway,
    user_ids: &[String],
    space_id: &str,
) -> Result<(), AppError> {
    if user_ids.is_empty() {
        return Ok(());
    }
    match host.submit_ban(user_ids, space_id).await {
        Ok(()) => {
            rosters::add_to_roster(pool, rosters::BANNED_USERS, user_ids).await?;
            let ids: HashSet<String> = user_ids.iter().cloned().collect();
            rosters::prune_history(pool, &ids).await?;
            tracing::info!(count = user_ids.len(), "ban submitted");
        }
        Err(e) => {
            tracing::error!("ban submission failed: {e}");
        }
    }
    Ok(())
}

/// Users banned this session but not blacklisted, resolved to profiles.
pub async fn banned_only_view(
    pool: &SqlitePool,
    host: &dyn HostGateway,
) -> Result<Vec<ResolvedUser>, AppError> {
    let banned = rosters::roster(pool, rosters::BANNED_USERS).await?;
    let blacklist = rosters::roster(pool, rosters::BLACKLIST).await?;

    let ids: HashSet<String> = banned.difference(&blacklist).cloned().collect();
    let mut users = resolve_all(host, &ids).await;
    users.sort_by_key(|u| u.global_name.clone().unwrap_or_default());
    Ok(users)
}

/// The full blacklist with stored reasons and status labels, sorted by
/// global name.
pub async fn blacklist_view(
    pool: &SqlitePool,
    host: &dyn HostGateway,
) -> Result<Vec<BlacklistEntryView>, AppError> {
    let blacklist = rosters::roster(pool, rosters::BLACKLIST).await?;
    let banned = rosters::roster(pool, rosters::BANNED_USERS).await?;
    let autoban = rosters::roster(pool, rosters::AUTOBAN_USERS).await?;

    let mut entries = Vec::new();
    for user in resolve_all(host, &blacklist).await {
        let reason = rosters::reason(pool, &user.id).await?;
        let status = status_label(&user.id, &autoban, &banned);
        entries.push(BlacklistEntryView {
            user,
            reason,
            status,
        });
    }
    entries.sort_by_key(|e| e.user.global_name.clone().unwrap_or_default());
    Ok(entries)
}

/// The join history minus banned users, blacklisted users, and the operator.
pub async fn history_view(
    pool: &SqlitePool,
    host: &dyn HostGateway,
) -> Result<Vec<UserRecord>, AppError> {
    let operator = host.current_operator_id().await?;
    let banned = rosters::roster(pool, rosters::BANNED_USERS).await?;
    let blacklist = rosters::roster(pool, rosters::BLACKLIST).await?;

    let mut records = rosters::history(pool).await?;
    records.retain(|r| {
        r.id != operator && !banned.contains(&r.id) && !blacklist.contains(&r.id)
    });
    Ok(records)
}

/// Resolve a set of ids, silently skipping anything the host cannot resolve.
async fn resolve_all(host: &dyn HostGateway, ids: &HashSet<String>) -> Vec<ResolvedUser> {
    let mut sorted: Vec<&String> = ids.iter().collect();
    sorted.sort_unstable();

    let mut users = Vec::with_capacity(sorted.len());
    for user_id in sorted {
        match host.resolve_user(user_id).await {
            Ok(Some(user)) => users.push(user),
            Ok(None) => tracing::debug!(%user_id, "user not resolvable"),
            Err(e) => tracing::debug!(%user_id, "resolution failed: {e}"),
        }
    }
    users
}
