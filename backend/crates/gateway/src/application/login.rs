//! Login Use Case
//!
//! Exchanges a credential for a backend access token and seals that token
//! into a session cookie value.

use std::sync::Arc;

use crate::application::credential_cipher::CredentialCipher;
use crate::application::session_codec::SessionCodec;
use crate::domain::{AuthInfo, AuthMethod, SecretsBackend, TokenData};
use crate::error::{GatewayError, GatewayResult};

/// Login input, borrowed from the request body
pub struct LoginInput<'a> {
    pub auth_type: &'a str,
    pub id: &'a str,
    pub password: Option<&'a str>,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    /// Encoded session envelope for the `auth` cookie
    pub cookie_value: String,
    pub data: TokenData,
}

/// Login use case
pub struct LoginUseCase<B>
where
    B: SecretsBackend,
{
    backend: Arc<B>,
    cipher: CredentialCipher<B>,
    codec: Arc<SessionCodec>,
}

impl<B> LoginUseCase<B>
where
    B: SecretsBackend,
{
    pub fn new(backend: Arc<B>, cipher: CredentialCipher<B>, codec: Arc<SessionCodec>) -> Self {
        Self {
            backend,
            cipher,
            codec,
        }
    }

    pub async fn execute(&self, input: LoginInput<'_>) -> GatewayResult<LoginOutput> {
        let mut auth = Self::validate(&input)?;
        let method = auth.method();

        let outcome = self.backend.login(&auth).await?;

        // From here on the session protects the access token, not the
        // credential the user typed in.
        auth.replace_id(outcome.client_token.to_string());

        let sealed = self
            .cipher
            .encrypt(auth)
            .await
            .map_err(GatewayError::CipherUnavailable)?;

        let cookie_value = self
            .codec
            .encode(&sealed)
            .map_err(GatewayError::CookieEncoding)?;

        tracing::info!(
            auth_type = %method,
            display_name = %outcome.data.display_name,
            "Login succeeded"
        );

        Ok(LoginOutput {
            cookie_value,
            data: outcome.data,
        })
    }

    fn validate(input: &LoginInput<'_>) -> GatewayResult<AuthInfo> {
        if input.auth_type.is_empty() || input.id.is_empty() {
            return Err(GatewayError::EmptyAuthentication);
        }

        let method: AuthMethod = input
            .auth_type
            .parse()
            .map_err(|_| GatewayError::UnsupportedAuthType)?;

        let auth = AuthInfo::new(method, input.id);

        match input.password.filter(|p| !p.is_empty()) {
            Some(password) => Ok(auth.with_password(password)),
            None if method.requires_password() => Err(GatewayError::EmptyAuthentication),
            None => Ok(auth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::GatewayConfig;
    use crate::application::session_codec::SessionKeys;
    use crate::domain::BackendError;
    use crate::test_support::FakeBackend;

    struct Fixture {
        backend: Arc<FakeBackend>,
        codec: Arc<SessionCodec>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                backend: Arc::new(FakeBackend::new()),
                codec: Arc::new(SessionCodec::new(
                    SessionKeys::generate(),
                    &GatewayConfig::default(),
                )),
            }
        }

        fn use_case(&self) -> LoginUseCase<FakeBackend> {
            LoginUseCase::new(
                self.backend.clone(),
                CredentialCipher::new(self.backend.clone(), "gateway"),
                self.codec.clone(),
            )
        }

        fn input<'a>(auth_type: &'a str, id: &'a str, password: Option<&'a str>) -> LoginInput<'a> {
            LoginInput {
                auth_type,
                id,
                password,
            }
        }
    }

    #[tokio::test]
    async fn test_token_login_seals_access_token() {
        let fx = Fixture::new();
        fx.backend.add_token("s.alice", "token-alice");

        let output = fx
            .use_case()
            .execute(Fixture::input("token", "s.alice", None))
            .await
            .unwrap();

        assert_eq!(output.data.display_name, "token-alice");
        assert_ne!(output.data.id, "s.alice");
        assert!(!output.cookie_value.contains("s.alice"));

        let sealed = fx.codec.decode(&output.cookie_value).unwrap();
        assert_eq!(sealed.method(), AuthMethod::Token);
        let auth = CredentialCipher::new(fx.backend.clone(), "gateway")
            .decrypt(sealed)
            .await
            .unwrap();
        assert_eq!(auth.id(), "s.alice");
    }

    #[tokio::test]
    async fn test_userpass_login_stores_issued_token_not_password() {
        let fx = Fixture::new();
        let token = fx.backend.add_user(AuthMethod::Userpass, "bob", "hunter22");

        let output = fx
            .use_case()
            .execute(Fixture::input("userpass", "bob", Some("hunter22")))
            .await
            .unwrap();

        let sealed = fx.codec.decode(&output.cookie_value).unwrap();
        assert_eq!(sealed.method(), AuthMethod::Userpass);
        let auth = CredentialCipher::new(fx.backend.clone(), "gateway")
            .decrypt(sealed)
            .await
            .unwrap();
        assert_eq!(auth.id(), token);
        assert!(auth.password().is_none());
    }

    #[tokio::test]
    async fn test_empty_fields_rejected_before_backend() {
        let fx = Fixture::new();
        for (t, id) in [("", "s.x"), ("token", ""), ("", "")] {
            let err = fx
                .use_case()
                .execute(Fixture::input(t, id, None))
                .await
                .unwrap_err();
            assert!(matches!(err, GatewayError::EmptyAuthentication));
        }
        let err = fx
            .use_case()
            .execute(Fixture::input("userpass", "bob", Some("")))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::EmptyAuthentication));
        assert_eq!(fx.backend.login_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let fx = Fixture::new();
        let err = fx
            .use_case()
            .execute(Fixture::input("kerberos", "x", None))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedAuthType));
    }

    #[tokio::test]
    async fn test_backend_rejection_passes_through() {
        let fx = Fixture::new();
        let err = fx
            .use_case()
            .execute(Fixture::input("token", "s.unknown", None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Backend(BackendError::Rejected { code: 403, .. })
        ));
    }

    #[tokio::test]
    async fn test_transit_failure_is_cipher_unavailable() {
        let fx = Fixture::new();
        fx.backend.add_token("s.alice", "token-alice");
        fx.backend
            .fail_transit(BackendError::Transport("connection refused".to_string()));

        let err = fx
            .use_case()
            .execute(Fixture::input("token", "s.alice", None))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::CipherUnavailable(_)));
    }
}
