pub mod admin;
pub mod api;
pub mod assets;
pub mod form;
pub mod health;
pub mod uploads;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use intake_service::SubmissionService;
use tower_http::trace::TraceLayer;

use crate::auth::{principal_middleware, AuthConfig};

pub struct InnerAppState {
    pub service: SubmissionService,
    pub auth: Option<Arc<AuthConfig>>,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .merge(form::routes())
        .merge(uploads::routes())
        .merge(assets::routes())
        .merge(health::routes());

    let protected = Router::new()
        .merge(admin::routes())
        .merge(api::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            principal_middleware,
        ));

    public
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
