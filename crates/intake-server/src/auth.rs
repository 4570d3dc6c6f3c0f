use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use intake_core::Principal;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::routes::AppState;

/// Admin authentication settings.
pub struct AuthConfig {
    /// SHA-256 hash of the configured admin key.
    pub admin_key_hash: String,
}

/// SHA-256 hash a raw key, returning the hex-encoded digest.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a new admin key: `pk_` + 43 chars of base62-encoded random bytes.
pub fn generate_api_key() -> String {
    use rand::Rng;
    const BASE62: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let random_part: String = (0..43)
        .map(|_| BASE62[rng.gen_range(0..BASE62.len())] as char)
        .collect();
    format!("pk_{random_part}")
}

/// Build auth settings from the configured key. `None` when no key is set,
/// in which case every request is anonymous.
pub fn build_auth_config(admin_key: Option<&str>) -> Option<Arc<AuthConfig>> {
    admin_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| {
            Arc::new(AuthConfig {
                admin_key_hash: sha256_hex(k),
            })
        })
}

/// Resolve the caller's [`Principal`] and store it in the request extensions.
///
/// No `Authorization` header means an anonymous principal; the handlers then
/// decide whether that is enough. A bearer token that does not match the
/// admin key is rejected here with 401.
pub async fn principal_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(""));

    let principal = match token {
        None => Principal::anonymous(),
        Some(token) => match &state.auth {
            Some(auth) if constant_time_eq(&sha256_hex(token), &auth.admin_key_hash) => {
                Principal::admin()
            }
            _ => {
                tracing::warn!(path = %request.uri().path(), "rejected admin key");
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "missing or invalid API key" })),
                )
                    .into_response();
            }
        },
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
