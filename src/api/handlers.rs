//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    settings::CountdownSettings,
    state::{AppError, AppState, CountdownError, CountdownPhase, CountdownStatus, SettingsUpdate},
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

type HandlerResult<T> = Result<Json<T>, (StatusCode, Json<ApiResponse>)>;

/// Map an application error to a status code and an error body
fn rejection(state: &AppState, action: &str, e: AppError) -> (StatusCode, Json<ApiResponse>) {
    match e {
        AppError::Countdown(e) => {
            warn!("Rejected {} request: {}", action, e);
            let countdown = state.status().ok();
            let code = match e {
                CountdownError::InvalidDuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::CONFLICT,
            };
            (code, Json(ApiResponse::error(e.to_string(), countdown)))
        }
        AppError::Lock(_) => {
            error!("Failed to handle {} request: {}", action, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string(), None)),
            )
        }
    }
}

fn current_status(state: &AppState, action: &str) -> Result<CountdownStatus, (StatusCode, Json<ApiResponse>)> {
    state.status().map_err(|e| rejection(state, action, e))
}

/// Handle POST /start - Start the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> HandlerResult<ApiResponse> {
    let total = state.start().map_err(|e| rejection(&state, "start", e))?;
    info!("Start endpoint called - countdown of {} started", total);
    let countdown = current_status(&state, "start")?;
    Ok(Json(ApiResponse::ok(format!("Countdown started for {}", total), countdown)))
}

/// Handle POST /pause - Pause or resume the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> HandlerResult<ApiResponse> {
    let phase = state.toggle_pause().map_err(|e| rejection(&state, "pause", e))?;
    let message = match phase {
        CountdownPhase::Paused => "Countdown paused",
        _ => "Countdown resumed",
    };
    info!("Pause endpoint called - {}", message.to_lowercase());
    let countdown = current_status(&state, "pause")?;
    Ok(Json(ApiResponse::ok(message.to_string(), countdown)))
}

/// Handle POST /reset - Abandon the countdown and restore the full duration
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> HandlerResult<ApiResponse> {
    let total = state.reset().map_err(|e| rejection(&state, "reset", e))?;
    info!("Reset endpoint called - countdown reset to {}", total);
    let countdown = current_status(&state, "reset")?;
    Ok(Json(ApiResponse::ok(format!("Countdown reset to {}", total), countdown)))
}

/// Handle GET /settings - Return the current inputs
pub async fn settings_handler(State(state): State<Arc<AppState>>) -> HandlerResult<CountdownSettings> {
    let countdown = current_status(&state, "settings")?;
    Ok(Json(countdown.settings))
}

/// Handle PUT /settings - Change destination, duration, finish message or format
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> HandlerResult<ApiResponse> {
    let countdown = state
        .update_settings(update)
        .map_err(|e| rejection(&state, "settings", e))?;
    info!("Settings endpoint called - inputs updated");
    Ok(Json(ApiResponse::ok("Settings updated".to_string(), countdown)))
}

/// Handle GET /status - Return current countdown status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> HandlerResult<StatusResponse> {
    let countdown = current_status(&state, "status")?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        countdown,
        polling: state.is_polling(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
