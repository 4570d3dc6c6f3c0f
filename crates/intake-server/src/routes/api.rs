use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use intake_core::Principal;
use intake_service::ServiceError;
use serde_json::{json, Value};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/submissions", get(list_submissions))
        .route("/api/submissions/{id}", get(get_submission))
}

async fn list_submissions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .list_submissions(&principal)
        .await
        .map(|s| Json(json!(s)))
        .map_err(to_error)
}

async fn get_submission(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .get_submission(&principal, id)
        .await
        .map(|s| Json(json!(s)))
        .map_err(to_error)
}

fn to_error(e: ServiceError) -> (StatusCode, Json<Value>) {
    let (status, msg) = match &e {
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        ServiceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, e.to_string()),
        ServiceError::Internal(_) => {
            tracing::error!(error = %e, "api request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
        }
    };
    (status, Json(json!({ "error": msg })))
}
