use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use runtime::{export::projection_csv, RawInputs, RunError, TriggerMode};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/styles.css", get(styles))
        .route("/static/app.js", get(script))
        .route("/projections", post(run_projection))
        .route("/projections/csv", post(run_projection_csv))
        .route("/projections/replay", post(replay_projection))
        .route("/settings", get(saved_settings))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ProjectionRequest {
    pub mode: TriggerMode,
    pub inputs: RawInputs,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn run_error_response(err: RunError) -> Response {
    let status = match err {
        RunError::Input(_) | RunError::Projection(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RunError::RunIdOverflow => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

async fn index() -> Html<&'static str> {
    Html(ui::index_html())
}

async fn styles() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], ui::styles_css())
}

async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        ui::app_js(),
    )
}

async fn run_projection(
    State(state): State<AppState>,
    Json(request): Json<ProjectionRequest>,
) -> Response {
    match state.run_projection(&request.inputs, request.mode) {
        Ok(run) => Json(run).into_response(),
        Err(err) => run_error_response(err),
    }
}

async fn run_projection_csv(
    State(state): State<AppState>,
    Json(request): Json<ProjectionRequest>,
) -> Response {
    let run = match state.run_projection(&request.inputs, request.mode) {
        Ok(run) => run,
        Err(err) => return run_error_response(err),
    };

    match projection_csv(&run.projection.sessions) {
        Ok(csv) => ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv).into_response(),
        Err(err) => {
            error!(run_id = run.run_id, error = %err, "csv export failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn replay_projection(State(state): State<AppState>) -> Response {
    match state.replay_saved() {
        None => StatusCode::NO_CONTENT.into_response(),
        Some(Ok(run)) => Json(run).into_response(),
        Some(Err(err)) => run_error_response(err),
    }
}

async fn saved_settings(State(state): State<AppState>) -> Response {
    match state.saved_settings() {
        Some(restored) => Json(restored).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
