//! CSRF Middleware
//!
//! Loads (or mints) the per-client CSRF base secret, makes it available to
//! handlers through request extensions, and rejects unsafe methods that do
//! not carry a matching `X-CSRF-Token` header.

use axum::extract::{Request, State};
use axum::http::{Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use platform::cookie::{extract_cookie, set_cookie_header};
use platform::csrf::CSRF_HEADER;

use crate::domain::SecretsBackend;
use crate::error::GatewayError;
use crate::presentation::handlers::GatewayAppState;

fn is_unsafe(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Middleware enforcing the double-submit CSRF check
pub async fn csrf_protect<B>(
    State(state): State<GatewayAppState<B>>,
    mut req: Request,
    next: Next,
) -> Response
where
    B: SecretsBackend + Sync + 'static,
{
    let existing = extract_cookie(req.headers(), state.config.csrf_cookie_name())
        .and_then(|cookie| state.csrf.open_secret(&cookie).ok());
    let minted = existing.is_none();
    let secret = Arc::new(existing.unwrap_or_else(|| state.csrf.new_secret()));

    if state.config.csrf_enabled && is_unsafe(req.method()) {
        let presented = req
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok());

        if let Err(e) = state.csrf.verify(&secret, presented) {
            return GatewayError::Csrf(e).into_response();
        }
    }

    req.extensions_mut().insert(secret.clone());

    let mut response = next.run(req).await;

    if minted {
        let sealed = state.csrf.seal_secret(&secret);
        if let Some(cookie) = set_cookie_header(&state.config.csrf_cookie, &sealed) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }

    response
}
