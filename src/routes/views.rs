use axum::extract::State;
use axum::Json;

use crate::coordinator;
use crate::db::rosters;
use crate::error::AppError;
use crate::state::AppState;

pub async fn blacklist(
    state: State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let entries = coordinator::blacklist_view(&state.db, state.host.as_ref()).await?;
    Ok(Json(serde_json::json!({ "data": entries })))
}

pub async fn blacklist_roster(
    state: State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let roster = rosters::roster(&state.db, rosters::BLACKLIST).await?;
    let mut roster: Vec<String> = roster.into_iter().collect();
    roster.sort_unstable();
    Ok(Json(serde_json::json!({ "data": { "blacklist": roster } })))
}

pub async fn banned(state: State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let users = coordinator::banned_only_view(&state.db, state.host.as_ref()).await?;
    Ok(Json(serde_json::json!({ "data": users })))
}

pub async fn history(state: State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let records = coordinator::history_view(&state.db, state.host.as_ref()).await?;
    Ok(Json(serde_json::json!({ "data": records })))
}
