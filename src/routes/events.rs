use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::models::channel::ChannelRenderEvent;
use crate::state::AppState;

pub async fn channel_render(
    state: State<AppState>,
    Json(event): Json<ChannelRenderEvent>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.monitor.observe(&event).await?;
    let phase = state.monitor.phase().await;
    Ok(Json(serde_json::json!({ "data": phase })))
}

pub async fn monitor_phase(state: State<AppState>) -> Json<serde_json::Value> {
    let phase = state.monitor.phase().await;
    Json(serde_json::json!({ "data": phase }))
}
