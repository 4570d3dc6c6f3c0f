use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use intake_core::Principal;
use intake_service::ServiceError;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/submissions", get(list_submissions))
}

async fn list_submissions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    state
        .service
        .render_admin_listing(&principal)
        .await
        .map(Html)
        .map_err(to_error)
}

fn to_error(e: ServiceError) -> (StatusCode, Html<String>) {
    let (status, msg) = match &e {
        ServiceError::Forbidden(_) => (
            StatusCode::FORBIDDEN,
            "You do not have sufficient permissions to access this page.",
        ),
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found."),
        ServiceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Bad request."),
        ServiceError::Internal(_) => {
            tracing::error!(error = %e, "admin listing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The submissions could not be loaded.",
            )
        }
    };
    (status, Html(format!("<p>{msg}</p>\n")))
}
