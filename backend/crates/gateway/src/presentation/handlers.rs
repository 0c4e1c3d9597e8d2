//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use platform::cookie::set_cookie_header;
use platform::csrf::{CSRF_HEADER, CsrfSecret, CsrfTokenSource};

use crate::application::{
    AuthResolver, CredentialCipher, GatewayConfig, HealthUseCase, LoginInput, LoginUseCase,
    RenewSelfUseCase, SessionCodec,
};
use crate::domain::SecretsBackend;
use crate::error::{GatewayError, GatewayResult};
use crate::presentation::dto::{
    HealthResponse, LoginRequest, LoginResponse, RenewSelfResponse, StatusResponse,
};

/// Shared state for gateway handlers
pub struct GatewayAppState<B>
where
    B: SecretsBackend + Sync + 'static,
{
    pub backend: Arc<B>,
    pub config: Arc<GatewayConfig>,
    pub codec: Arc<SessionCodec>,
    pub csrf: Arc<CsrfTokenSource>,
}

impl<B> Clone for GatewayAppState<B>
where
    B: SecretsBackend + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            config: self.config.clone(),
            codec: self.codec.clone(),
            csrf: self.csrf.clone(),
        }
    }
}

impl<B> GatewayAppState<B>
where
    B: SecretsBackend + Sync + 'static,
{
    fn cipher(&self) -> CredentialCipher<B> {
        CredentialCipher::new(self.backend.clone(), self.config.transit_key.clone())
    }

    fn resolver(&self) -> AuthResolver<B> {
        AuthResolver::new(self.codec.clone(), self.cipher())
    }
}

// ============================================================================
// CSRF
// ============================================================================

/// GET /api/csrf
pub async fn fetch_csrf<B>(
    State(state): State<GatewayAppState<B>>,
    Extension(secret): Extension<Arc<CsrfSecret>>,
) -> GatewayResult<impl IntoResponse>
where
    B: SecretsBackend + Sync + 'static,
{
    let token = HeaderValue::from_str(&state.csrf.issue(&secret))
        .map_err(|e| GatewayError::Internal(e.to_string()))?;

    Ok((
        [(HeaderName::from_static(CSRF_HEADER), token)],
        Json(StatusResponse { status: "fetched" }),
    ))
}

// ============================================================================
// Health
// ============================================================================

/// GET /api/health
pub async fn health<B>(
    State(state): State<GatewayAppState<B>>,
) -> GatewayResult<Json<HealthResponse>>
where
    B: SecretsBackend + Sync + 'static,
{
    let result = HealthUseCase::new(state.backend.clone()).execute().await?;

    Ok(Json(HealthResponse { result }))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/login
pub async fn login<B>(
    State(state): State<GatewayAppState<B>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> GatewayResult<impl IntoResponse>
where
    B: SecretsBackend + Sync + 'static,
{
    let Json(req) = payload.map_err(|_| GatewayError::InvalidAuthFormat)?;

    let use_case = LoginUseCase::new(state.backend.clone(), state.cipher(), state.codec.clone());

    let output = use_case
        .execute(LoginInput {
            auth_type: &req.auth_type,
            id: &req.id,
            password: req.password.as_deref(),
        })
        .await?;

    let cookie = set_cookie_header(&state.config.session_cookie, &output.cookie_value)
        .ok_or_else(|| GatewayError::Internal("session cookie is not a valid header".into()))?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            status: "Logged in",
            data: output.data,
        }),
    ))
}

// ============================================================================
// Renew Self
// ============================================================================

/// POST /api/renew-self
pub async fn renew_self<B>(
    State(state): State<GatewayAppState<B>>,
    headers: HeaderMap,
) -> GatewayResult<Json<RenewSelfResponse>>
where
    B: SecretsBackend + Sync + 'static,
{
    let use_case = RenewSelfUseCase::new(state.backend.clone(), state.resolver());

    let data = use_case.execute(&headers).await?;

    Ok(Json(RenewSelfResponse { data }))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/logout
///
/// Only the cookie is cleared; the backend token stays valid until its
/// own TTL runs out.
pub async fn logout<B>(State(state): State<GatewayAppState<B>>) -> impl IntoResponse
where
    B: SecretsBackend + Sync + 'static,
{
    let cookie = state.config.session_cookie.build_delete_cookie();

    (
        [(header::SET_COOKIE, cookie)],
        Json(StatusResponse {
            status: "Logged out",
        }),
    )
}
