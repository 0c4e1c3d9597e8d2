//! CSRF token source
//!
//! Double-submit scheme with masked tokens:
//! - each client holds a random base secret in an HMAC-signed cookie;
//! - issued tokens are `otp || (otp XOR secret)` so that every token handed
//!   out differs;
//! - a presented token is valid when it unmasks to the cookie's secret.

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{
    constant_time_eq, from_base64_url, hmac_sha256, random_bytes, random_key, to_base64_url,
    verify_hmac_sha256,
};

/// Base secret length in bytes
pub const TOKEN_LEN: usize = 32;

/// Signing key length in bytes
pub const KEY_LEN: usize = 32;

/// Header carrying the masked token in both directions
pub const CSRF_HEADER: &str = "x-csrf-token";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsrfError {
    #[error("CSRF token missing")]
    MissingToken,

    #[error("CSRF token malformed")]
    MalformedToken,

    #[error("CSRF token does not match")]
    Mismatch,

    #[error("CSRF cookie invalid")]
    InvalidCookie,
}

/// Per-client base secret
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CsrfSecret([u8; TOKEN_LEN]);

impl CsrfSecret {
    fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; TOKEN_LEN] = bytes.try_into().ok()?;
        Some(Self(array))
    }
}

impl std::fmt::Debug for CsrfSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CsrfSecret").field(&"[REDACTED]").finish()
    }
}

/// Issues and checks CSRF tokens
pub struct CsrfTokenSource {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl CsrfTokenSource {
    pub fn new(key: Zeroizing<[u8; KEY_LEN]>) -> Self {
        Self { key }
    }

    /// Create a source with a freshly generated signing key
    pub fn generate() -> Self {
        Self::new(random_key())
    }

    /// Mint a new base secret for a client
    pub fn new_secret(&self) -> CsrfSecret {
        let mut secret = CsrfSecret([0u8; TOKEN_LEN]);
        secret.0.copy_from_slice(&random_bytes(TOKEN_LEN));
        secret
    }

    /// Signed cookie value for a base secret
    pub fn seal_secret(&self, secret: &CsrfSecret) -> String {
        let encoded = to_base64_url(&secret.0);
        let mac = hmac_sha256(&*self.key, &[encoded.as_bytes()]);
        format!("{}.{}", encoded, to_base64_url(&mac))
    }

    /// Verify and unpack a signed cookie value
    pub fn open_secret(&self, cookie: &str) -> Result<CsrfSecret, CsrfError> {
        let (encoded, mac) = cookie.split_once('.').ok_or(CsrfError::InvalidCookie)?;
        let mac = from_base64_url(mac).map_err(|_| CsrfError::InvalidCookie)?;

        if !verify_hmac_sha256(&*self.key, &[encoded.as_bytes()], &mac) {
            return Err(CsrfError::InvalidCookie);
        }

        let bytes = Zeroizing::new(from_base64_url(encoded).map_err(|_| CsrfError::InvalidCookie)?);
        CsrfSecret::from_slice(&bytes).ok_or(CsrfError::InvalidCookie)
    }

    /// Issue a masked token for `secret`
    pub fn issue(&self, secret: &CsrfSecret) -> String {
        let otp = random_bytes(TOKEN_LEN);
        let mut masked = Vec::with_capacity(TOKEN_LEN * 2);
        masked.extend_from_slice(&otp);
        masked.extend(otp.iter().zip(secret.0.iter()).map(|(o, s)| o ^ s));
        to_base64_url(&masked)
    }

    /// Check a presented token against the client's secret
    pub fn verify(&self, secret: &CsrfSecret, presented: Option<&str>) -> Result<(), CsrfError> {
        let presented = presented
            .filter(|token| !token.is_empty())
            .ok_or(CsrfError::MissingToken)?;

        let masked = from_base64_url(presented).map_err(|_| CsrfError::MalformedToken)?;
        if masked.len() != TOKEN_LEN * 2 {
            return Err(CsrfError::MalformedToken);
        }

        let (otp, body) = masked.split_at(TOKEN_LEN);
        let unmasked: Zeroizing<Vec<u8>> =
            Zeroizing::new(otp.iter().zip(body.iter()).map(|(o, b)| o ^ b).collect());

        if constant_time_eq(&unmasked, &secret.0) {
            Ok(())
        } else {
            Err(CsrfError::Mismatch)
        }
    }
}
