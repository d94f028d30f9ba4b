use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all crease endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/matches", post(handler::create_match))
        .route("/v1/matches/:id", get(handler::get_match))
        .route("/v1/matches/:id/innings", post(handler::start_innings))
        .route("/v1/innings/:id", get(handler::get_innings))
        .route("/v1/innings/:id/deliveries", post(handler::record_delivery))
        .route("/v1/innings/:id/undo", post(handler::undo_delivery))
        .route("/v1/innings/:id/swap-strike", post(handler::swap_strike))
        .route("/v1/innings/:id/bowler", put(handler::set_bowler))
        .route("/v1/innings/:id/batsman", put(handler::replace_batsman))
        .route("/v1/innings/:id/balls", get(handler::get_balls))
        .route("/v1/innings/:id/summary", get(handler::get_summary))
        .route("/v1/innings/:id/replay", get(handler::get_replay))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
