// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::events::stream_events;
use crate::presentation::handlers::{
    get_layout, get_metrics, get_pressure_compensation, get_readings, get_series, health_check,
    select_window, set_fan, system_action,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    // CompressionLayer leaves text/event-stream alone
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/metrics", get(get_metrics))
        .route("/api/layout", get(get_layout))
        .route("/api/readings", get(get_readings))
        .route("/api/series", get(get_series))
        .route("/api/window/:window", put(select_window))
        .route("/api/fan/:duty", put(set_fan))
        .route("/api/events", get(stream_events))
        .route("/api/system/:action", post(system_action))
        .route("/api/tools/pressure-compensation", get(get_pressure_compensation))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
