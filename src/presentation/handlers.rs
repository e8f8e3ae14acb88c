// HTTP request handlers
use crate::domain::system::SystemAction;
use crate::domain::units::{pressure_compensation, AltitudeUnit};
use crate::domain::window::TimeRangeWindow;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize, Default)]
pub struct ConfirmBody {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Deserialize)]
pub struct AltitudeQuery {
    pub altitude: f64,
    #[serde(default)]
    pub unit: AltitudeUnit,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Active metric set for this board
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.active().clone())
}

/// Chart panels for the selected window
pub async fn get_layout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.layout(state.selected_window()))
}

/// Latest header reading; 204 until the first poll lands
pub async fn get_readings(State(state): State<Arc<AppState>>) -> Response {
    match state.service.store().readings().await {
        Some(reading) => Json(reading).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Latest history snapshot; 204 until the first fetch lands
pub async fn get_series(State(state): State<Arc<AppState>>) -> Response {
    match state.service.store().series().await {
        Some(snapshot) => Json(snapshot).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn select_window(
    Path(window): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let window: TimeRangeWindow = match window.parse() {
        Ok(w) => w,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    // the poller fetches immediately when the value changes
    state.window_tx.send_if_modified(|current| {
        let changed = *current != window;
        *current = window;
        changed
    });
    Json(state.service.layout(window)).into_response()
}

pub async fn set_fan(Path(duty): Path<u8>, State(state): State<Arc<AppState>>) -> Response {
    if duty > 100 {
        return (StatusCode::BAD_REQUEST, "fan duty must be between 0 and 100").into_response();
    }
    if !state.service.set_fan_duty(duty) {
        return (StatusCode::NOT_FOUND, "no fan configured").into_response();
    }
    Json(json!({ "fan": duty })).into_response()
}

pub async fn system_action(
    Path(action): Path<String>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<ConfirmBody>>,
) -> Response {
    let action: SystemAction = match action.parse() {
        Ok(a) => a,
        Err(e) => return (StatusCode::NOT_FOUND, e).into_response(),
    };
    let confirmed = body.map(|Json(b)| b.confirm).unwrap_or(false);

    let outcome = state.service.perform_system_action(action, confirmed).await;
    Json(outcome).into_response()
}

pub async fn get_pressure_compensation(Query(query): Query<AltitudeQuery>) -> impl IntoResponse {
    Json(pressure_compensation(query.altitude, query.unit))
}
