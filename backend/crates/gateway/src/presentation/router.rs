//! Gateway Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use platform::csrf::CsrfTokenSource;

use crate::application::{GatewayConfig, SessionCodec, SessionKeys};
use crate::domain::SecretsBackend;
use crate::infra::vault::VaultClient;
use crate::presentation::handlers::{self, GatewayAppState};
use crate::presentation::middleware::csrf_protect;

/// Create the gateway router backed by Vault
pub fn gateway_router(
    client: VaultClient,
    config: GatewayConfig,
    keys: SessionKeys,
    csrf: CsrfTokenSource,
) -> Router {
    gateway_router_generic(client, config, keys, csrf)
}

/// Create a gateway router for any secrets backend implementation
pub fn gateway_router_generic<B>(
    backend: B,
    config: GatewayConfig,
    keys: SessionKeys,
    csrf: CsrfTokenSource,
) -> Router
where
    B: SecretsBackend + Sync + 'static,
{
    let codec = SessionCodec::new(keys, &config);
    let state = GatewayAppState {
        backend: Arc::new(backend),
        config: Arc::new(config),
        codec: Arc::new(codec),
        csrf: Arc::new(csrf),
    };

    Router::new()
        .route("/csrf", get(handlers::fetch_csrf::<B>))
        .route("/health", get(handlers::health::<B>))
        .route("/login", post(handlers::login::<B>))
        .route("/renew-self", post(handlers::renew_self::<B>))
        .route("/logout", post(handlers::logout::<B>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            csrf_protect::<B>,
        ))
        .with_state(state)
}
