mod events;
mod health;
mod moderation;
mod views;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/version", get(health::version))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Membership monitor
        .route("/events/channel-render", post(events::channel_render))
        .route("/monitor", get(events::monitor_phase))
        // Blacklist coordinator
        .route(
            "/blacklist/{user_id}/toggle",
            post(moderation::toggle_blacklist),
        )
        .route("/blacklist/reasons", put(moderation::set_reasons))
        .route("/autoban/toggle", post(moderation::toggle_auto_ban))
        .route("/bans", post(moderation::create_bans))
        // Read views
        .route("/blacklist", get(views::blacklist))
        .route("/blacklist/roster", get(views::blacklist_roster))
        .route("/views/banned", get(views::banned))
        .route("/views/history", get(views::history))
}
