//! Auth Resolver
//!
//! Finds the caller's credential for a request:
//! 1. a non-empty `X-Vault-Token` header is used as-is (token method), the
//!    cookie is not consulted;
//! 2. otherwise the session cookie is decoded and its `id` decrypted.

use std::sync::Arc;

use axum::http::HeaderMap;
use platform::cookie::extract_cookie;

use crate::application::credential_cipher::CredentialCipher;
use crate::application::session_codec::SessionCodec;
use crate::domain::{AuthInfo, SecretsBackend};
use crate::error::{GatewayError, GatewayResult};

/// Header carrying a raw backend token
pub const TOKEN_HEADER: &str = "x-vault-token";

pub struct AuthResolver<B>
where
    B: SecretsBackend,
{
    codec: Arc<SessionCodec>,
    cipher: CredentialCipher<B>,
}

impl<B> AuthResolver<B>
where
    B: SecretsBackend,
{
    pub fn new(codec: Arc<SessionCodec>, cipher: CredentialCipher<B>) -> Self {
        Self { codec, cipher }
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> GatewayResult<AuthInfo> {
        if let Some(token) = headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
        {
            return Ok(AuthInfo::token(token));
        }

        let cookie =
            extract_cookie(headers, self.codec.cookie_name()).ok_or(GatewayError::NotLoggedIn)?;

        let sealed = self.codec.decode(&cookie)?;

        Ok(self.cipher.decrypt(sealed).await?)
    }
}
