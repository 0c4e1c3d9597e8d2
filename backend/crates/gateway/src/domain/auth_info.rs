//! AuthInfo Entity
//!
//! A credential moves through two states:
//! - [`AuthInfo`] - plaintext, only ever held in process memory for one
//!   request. Backend calls accept nothing else.
//! - [`SealedAuthInfo`] - `id` replaced by backend ciphertext. The only form
//!   that may be serialized into a cookie.
//!
//! Both wipe their secrets on drop, so every construction site (including
//! early returns and error paths) releases the credential on scope exit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::auth_method::AuthMethod;

/// Plaintext credential
///
/// `id` is method specific: a token, a username (userpass/ldap), a GitHub
/// token or an AppRole role ID. After a successful login it is overwritten
/// with the backend access token, so anything persisted later protects the
/// session token rather than the original credential.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AuthInfo {
    #[zeroize(skip)]
    method: AuthMethod,
    id: String,
    /// Companion secret for methods that need one (password, secret ID)
    password: Option<String>,
}

impl AuthInfo {
    pub fn new(method: AuthMethod, id: impl Into<String>) -> Self {
        Self {
            method,
            id: id.into(),
            password: None,
        }
    }

    /// Credential carried by an `X-Vault-Token` style header
    pub fn token(token: impl Into<String>) -> Self {
        Self::new(AuthMethod::Token, token)
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    #[inline]
    pub fn method(&self) -> AuthMethod {
        self.method
    }

    /// The sensitive identifier. Never log or serialize it.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Swap `id` for a new value, wiping the old one
    ///
    /// The companion password is wiped as well: once `id` holds an access
    /// token the original credential has no further use.
    pub fn replace_id(&mut self, id: String) {
        self.id.zeroize();
        self.password.zeroize();
        self.id = id;
    }

    /// Wipe all secrets now instead of waiting for drop
    pub fn clear(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInfo")
            .field("method", &self.method)
            .field("id", &"[REDACTED]")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Credential whose `id` has been encrypted by the backend
///
/// This is the cookie payload: `{"type": "<method>", "id": "<ciphertext>"}`.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SealedAuthInfo {
    #[serde(rename = "type")]
    #[zeroize(skip)]
    method: AuthMethod,
    #[serde(rename = "id")]
    ciphertext: String,
}

impl SealedAuthInfo {
    pub fn new(method: AuthMethod, ciphertext: impl Into<String>) -> Self {
        Self {
            method,
            ciphertext: ciphertext.into(),
        }
    }

    #[inline]
    pub fn method(&self) -> AuthMethod {
        self.method
    }

    #[inline]
    pub fn ciphertext(&self) -> &str {
        &self.ciphertext
    }
}

impl fmt::Debug for SealedAuthInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedAuthInfo")
            .field("method", &self.method)
            .field("ciphertext", &"[SEALED]")
            .finish()
    }
}

/// Token metadata returned by a successful login
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenData {
    pub display_name: String,
    /// Token accessor; identifies the token without granting its use
    pub id: String,
    pub meta: Option<BTreeMap<String, String>>,
    pub policies: Vec<String>,
    pub renewable: bool,
    /// Remaining lease in seconds
    pub ttl: u64,
}

/// Lease information after a self-renewal
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenewalData {
    pub meta: Option<BTreeMap<String, String>>,
    pub policies: Vec<String>,
    pub ttl: u64,
}
