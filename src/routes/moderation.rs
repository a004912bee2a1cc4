use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::coordinator;
use crate::db::rosters;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ToggleBlacklistBody {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct SetReasonsBody {
    pub user_ids: Vec<String>,
    pub reason: String,
}

#[derive(Deserialize)]
pub struct UserIdsBody {
    pub user_ids: Vec<String>,
}

pub async fn toggle_blacklist(
    state: State<AppState>,
    Path(user_id): Path<String>,
    body: Option<Json<ToggleBlacklistBody>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let reason = body.and_then(|b| b.reason.clone());
    let outcome = coordinator::toggle_blacklist(&state.db, &user_id, reason.as_deref()).await?;
    Ok(Json(serde_json::json!({ "data": outcome })))
}

pub async fn set_reasons(
    state: State<AppState>,
    Json(body): Json<SetReasonsBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.user_ids.is_empty() {
        return Err(AppError::BadRequest("user_ids must not be empty".to_string()));
    }
    coordinator::set_reasons(&state.db, &body.user_ids, &body.reason).await?;
    Ok(Json(serde_json::json!({ "data": null })))
}

pub async fn toggle_auto_ban(
    state: State<AppState>,
    Json(body): Json<UserIdsBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.user_ids.is_empty() {
        return Err(AppError::BadRequest("user_ids must not be empty".to_string()));
    }
    let flagged = coordinator::toggle_auto_ban(&state.db, &body.user_ids).await?;
    let mut flagged: Vec<String> = flagged.into_iter().collect();
    flagged.sort_unstable();
    Ok(Json(serde_json::json!({ "data": { "autoban_users": flagged } })))
}

pub async fn create_bans(
    state: State<AppState>,
    Json(body): Json<UserIdsBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.user_ids.is_empty() {
        return Err(AppError::BadRequest("user_ids must not be empty".to_string()));
    }
    coordinator::request_ban(&state.db, state.host.as_ref(), &body.user_ids, &state.space_id)
        .await?;
    let banned = rosters::roster(&state.db, rosters::BANNED_USERS).await?;
    let mut banned: Vec<String> = banned.into_iter().collect();
    banned.sort_unstable();
    Ok(Json(serde_json::json!({ "data": { "banned_users": banned } })))
}
