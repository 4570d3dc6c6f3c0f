use axum::{http::header, response::IntoResponse, routing::get, Router};

use super::AppState;

const FORM_STYLES: &str = include_str!("../../assets/form-styles.css");

pub fn routes() -> Router<AppState> {
    Router::new().route("/assets/form-styles.css", get(form_styles))
}

async fn form_styles() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], FORM_STYLES)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::test_helpers::{body_string, test_router};

    #[tokio::test]
    async fn stylesheet_is_served_as_css() {
        let app = test_router().await;
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/assets/form-styles.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/css; charset=utf-8");
        assert!(body_string(resp).await.contains("form"));
    }
}
