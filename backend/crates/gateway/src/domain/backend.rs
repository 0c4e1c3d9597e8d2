//! Secrets Backend Port
//!
//! The external secrets-management service is the only source of truth for
//! token validity and the only holder of the transit encryption key. The
//! implementation lives in the infrastructure layer.

use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::auth_info::{AuthInfo, RenewalData, TokenData};

pub type BackendResult<T> = Result<T, BackendError>;

/// Failure reported by, or while talking to, the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend answered with an error status and messages
    #[error("backend rejected request (code {code}): {}", messages.join("; "))]
    Rejected { code: u16, messages: Vec<String> },

    /// Connection failure or timeout
    #[error("backend transport error: {0}")]
    Transport(String),

    /// The backend answered but the body was not what the API promises
    #[error("malformed backend response: {0}")]
    Malformed(String),

    /// Error text without the expected `Code:` / `*` markers
    #[error("unparseable backend error: {0}")]
    Unparseable(String),
}

impl BackendError {
    /// Parse the textual error shape used by backend client libraries:
    ///
    /// ```text
    /// Error making API request.
    ///
    /// URL: PUT https://vault/v1/auth/token/renew-self
    /// Code: 403. Errors:
    ///
    /// * permission denied
    /// ```
    ///
    /// Both the `Code:` marker and a `*`-delimited message must be present,
    /// otherwise the whole text is kept as [`BackendError::Unparseable`].
    pub fn from_error_text(text: &str) -> Self {
        let (Some((_, after_code)), Some(message)) =
            (text.split_once("Code:"), text.split('*').nth(1))
        else {
            return BackendError::Unparseable(text.to_string());
        };

        let digits: String = after_code
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let code = digits.parse().unwrap_or(500);

        BackendError::Rejected {
            code,
            messages: vec![message.trim().to_string()],
        }
    }
}

/// Result of exchanging a credential for an access token
pub struct LoginOutcome {
    pub client_token: Zeroizing<String>,
    pub data: TokenData,
}

/// Secrets backend operations
///
/// None of these retry; retry policy belongs to the caller.
#[trait_variant::make(SecretsBackend: Send)]
pub trait LocalSecretsBackend {
    /// Exchange `method` + `id` for an access token and its metadata
    async fn login(&self, auth: &AuthInfo) -> BackendResult<LoginOutcome>;

    /// Extend the lease of the access token held in `auth.id()`
    async fn renew_self(&self, auth: &AuthInfo) -> BackendResult<RenewalData>;

    /// Unauthenticated liveness probe; the backend's status body
    async fn health(&self) -> BackendResult<serde_json::Value>;

    /// Encrypt with the named transit key, returning the ciphertext
    async fn encrypt(&self, key_name: &str, plaintext: &[u8]) -> BackendResult<String>;

    /// Decrypt with the named transit key
    async fn decrypt(&self, key_name: &str, ciphertext: &str)
    -> BackendResult<Zeroizing<Vec<u8>>>;
}
