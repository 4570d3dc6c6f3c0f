use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use intake_service::ServiceError;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/uploads/{name}", get(download))
}

async fn download(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.service.read_upload(&name).await {
        Ok(data) => {
            let disposition = format!("attachment; filename=\"{}\"", quoted_file_name(&name));
            (
                [
                    (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                data,
            )
                .into_response()
        }
        Err(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!(file = %name, error = %e, "upload read failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Keep the header value printable ASCII and free of quote characters.
fn quoted_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}
