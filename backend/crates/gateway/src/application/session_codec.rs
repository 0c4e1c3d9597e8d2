//! Session Codec
//!
//! Turns a [`SealedAuthInfo`] into an opaque, tamper-evident cookie value
//! and back. Keys are generated once per process; restarting the gateway
//! invalidates every outstanding session.

use std::fmt;

use platform::crypto::random_key;
use platform::secure_cookie::{BLOCK_KEY_LEN, HASH_KEY_LEN, SecureCookie, SecureCookieError};
use zeroize::Zeroizing;

use crate::application::config::GatewayConfig;
use crate::domain::SealedAuthInfo;

/// Envelope keys: 64-byte HMAC key and 32-byte AES key
pub struct SessionKeys {
    hash_key: Zeroizing<[u8; HASH_KEY_LEN]>,
    block_key: Zeroizing<[u8; BLOCK_KEY_LEN]>,
}

impl SessionKeys {
    pub fn new(
        hash_key: Zeroizing<[u8; HASH_KEY_LEN]>,
        block_key: Zeroizing<[u8; BLOCK_KEY_LEN]>,
    ) -> Self {
        Self {
            hash_key,
            block_key,
        }
    }

    /// Fresh keys from the OS RNG
    pub fn generate() -> Self {
        Self::new(random_key(), random_key())
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKeys([REDACTED])")
    }
}

/// Session cookie codec
#[derive(Debug)]
pub struct SessionCodec {
    envelope: SecureCookie,
    cookie_name: String,
}

impl SessionCodec {
    pub fn new(keys: SessionKeys, config: &GatewayConfig) -> Self {
        let envelope =
            SecureCookie::new(keys.hash_key, keys.block_key).with_max_age(config.session_max_age);

        Self {
            envelope,
            cookie_name: config.session_cookie_name().to_string(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn encode(&self, sealed: &SealedAuthInfo) -> Result<String, SecureCookieError> {
        self.envelope.encode(&self.cookie_name, sealed)
    }

    /// Encode with an explicit issuance time (unix seconds)
    pub fn encode_at(&self, sealed: &SealedAuthInfo, now: i64) -> Result<String, SecureCookieError> {
        self.envelope.encode_at(&self.cookie_name, sealed, now)
    }

    /// Tampered, expired, or malformed values all fail here
    pub fn decode(&self, value: &str) -> Result<SealedAuthInfo, SecureCookieError> {
        self.envelope.decode(&self.cookie_name, value)
    }

    /// Decode against an explicit current time (unix seconds)
    pub fn decode_at(&self, value: &str, now: i64) -> Result<SealedAuthInfo, SecureCookieError> {
        self.envelope.decode_at(&self.cookie_name, value, now)
    }
}
