//! Basic-auth gate in front of every route.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jmxport_security::decode_basic_auth;
use std::sync::Arc;

use crate::state::AppState;

/// Realm advertised in `WWW-Authenticate`
pub const REALM: &str = "/";

/// Reject requests without accepted Basic credentials.
///
/// Missing, malformed and wrong credentials all get the same empty 401.
/// The check itself may hash, so it runs on the blocking pool.
pub async fn basic_auth_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(authenticator) = state.authenticator.as_ref().map(Arc::clone) else {
        return next.run(req).await;
    };

    let credentials = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic_auth);
    let Some(credentials) = credentials else {
        tracing::debug!("Missing or malformed Authorization header");
        return unauthorized();
    };

    let check = tokio::task::spawn_blocking(move || {
        authenticator.authenticate(credentials.username(), credentials.password())
    });
    match check.await {
        Ok(true) => next.run(req).await,
        Ok(false) => unauthorized(),
        Err(e) => {
            tracing::error!("Credential check failed: {}", e);
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    let challenge = format!("Basic realm=\"{}\"", REALM);
    match HeaderValue::from_str(&challenge) {
        Ok(value) => (StatusCode::UNAUTHORIZED, [(header::WWW_AUTHENTICATE, value)]).into_response(),
        Err(_) => StatusCode::UNAUTHORIZED.into_response(),
    }
}
