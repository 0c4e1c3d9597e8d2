//! Renew Self Use Case
//!
//! Extends the lease of the caller's own token.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::application::resolve_auth::AuthResolver;
use crate::domain::{RenewalData, SecretsBackend};
use crate::error::GatewayResult;

pub struct RenewSelfUseCase<B>
where
    B: SecretsBackend,
{
    backend: Arc<B>,
    resolver: AuthResolver<B>,
}

impl<B> RenewSelfUseCase<B>
where
    B: SecretsBackend,
{
    pub fn new(backend: Arc<B>, resolver: AuthResolver<B>) -> Self {
        Self { backend, resolver }
    }

    /// The session cookie itself is not reissued; its absolute lifetime
    /// stays anchored to login.
    pub async fn execute(&self, headers: &HeaderMap) -> GatewayResult<RenewalData> {
        let auth = self.resolver.resolve(headers).await?;

        let data = self.backend.renew_self(&auth).await?;

        tracing::debug!(auth_type = %auth.method(), ttl = data.ttl, "Token renewed");

        Ok(data)
    }
}
