//! Authenticated-encryption cookie envelope
//!
//! Encodes any serializable value into a cookie-safe string that is both
//! confidential and tamper-evident, keyed by two server-held secrets:
//!
//! 1. the value is serialized as JSON and sealed with AES-256-GCM under the
//!    block key (random 96-bit nonce, cookie name as associated data);
//! 2. `HMAC-SHA256(hash key, name|timestamp|payload)` authenticates the
//!    issuance timestamp together with the sealed payload;
//! 3. the result is `base64url(timestamp|payload|mac)`.
//!
//! Decoding enforces an absolute max age measured from issuance. Nothing
//! here slides: re-encoding is the only way to get a fresh timestamp.
//!
//! Keys live only in process memory. Restarting the process with fresh keys
//! invalidates every envelope issued before.

use std::time::Duration;

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto::{from_base64_url, hmac_sha256, random_bytes, random_key, to_base64_url, verify_hmac_sha256};

/// HMAC key length in bytes
pub const HASH_KEY_LEN: usize = 64;

/// AES-256 key length in bytes
pub const BLOCK_KEY_LEN: usize = 32;

/// Browsers cap a cookie at roughly 4 KiB
pub const MAX_ENCODED_LEN: usize = 4096;

const NONCE_LEN: usize = 12;

/// Default max age when none is configured (30 days)
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(86400 * 30);

/// Envelope errors
///
/// Variants carry no payload data so that nothing from a rejected cookie
/// can end up in logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecureCookieError {
    #[error("encoded value exceeds {MAX_ENCODED_LEN} bytes")]
    TooLong,

    #[error("encoded value is not valid base64")]
    Base64,

    #[error("encoded value is malformed")]
    Malformed,

    #[error("MAC verification failed")]
    MacInvalid,

    #[error("timestamp is invalid")]
    InvalidTimestamp,

    #[error("envelope has expired")]
    Expired,

    #[error("payload encryption failed")]
    Encrypt,

    #[error("payload decryption failed")]
    Decrypt,

    #[error("payload serialization failed")]
    Serialize,

    #[error("payload deserialization failed")]
    Deserialize,
}

/// Cookie envelope codec
pub struct SecureCookie {
    hash_key: Zeroizing<[u8; HASH_KEY_LEN]>,
    block_key: Zeroizing<[u8; BLOCK_KEY_LEN]>,
    max_age_secs: i64,
}

impl SecureCookie {
    pub fn new(
        hash_key: Zeroizing<[u8; HASH_KEY_LEN]>,
        block_key: Zeroizing<[u8; BLOCK_KEY_LEN]>,
    ) -> Self {
        Self {
            hash_key,
            block_key,
            max_age_secs: DEFAULT_MAX_AGE.as_secs() as i64,
        }
    }

    /// Create a codec with freshly generated keys
    pub fn generate() -> Self {
        Self::new(random_key(), random_key())
    }

    /// Set the absolute max age enforced on decode
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age_secs = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        self
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs.max(0) as u64)
    }

    /// Encode `value` for the cookie called `name`
    pub fn encode<T: Serialize>(&self, name: &str, value: &T) -> Result<String, SecureCookieError> {
        self.encode_at(name, value, chrono::Utc::now().timestamp())
    }

    /// Encode with an explicit issuance time (unix seconds)
    pub fn encode_at<T: Serialize>(
        &self,
        name: &str,
        value: &T,
        now: i64,
    ) -> Result<String, SecureCookieError> {
        let plaintext = Zeroizing::new(
            serde_json::to_vec(value).map_err(|_| SecureCookieError::Serialize)?,
        );

        let nonce = random_bytes(NONCE_LEN);
        let ciphertext = self
            .cipher()
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &plaintext,
                    aad: name.as_bytes(),
                },
            )
            .map_err(|_| SecureCookieError::Encrypt)?;

        let mut sealed = nonce;
        sealed.extend_from_slice(&ciphertext);
        let payload = to_base64_url(&sealed);

        let timestamp = now.to_string();
        let mac = hmac_sha256(
            &*self.hash_key,
            &[name.as_bytes(), b"|", timestamp.as_bytes(), b"|", payload.as_bytes()],
        );

        let envelope = format!("{}|{}|{}", timestamp, payload, to_base64_url(&mac));
        let encoded = to_base64_url(envelope.as_bytes());

        if encoded.len() > MAX_ENCODED_LEN {
            return Err(SecureCookieError::TooLong);
        }
        Ok(encoded)
    }

    /// Decode a value previously produced by [`SecureCookie::encode`]
    pub fn decode<T: DeserializeOwned>(&self, name: &str, value: &str) -> Result<T, SecureCookieError> {
        self.decode_at(name, value, chrono::Utc::now().timestamp())
    }

    /// Decode against an explicit current time (unix seconds)
    pub fn decode_at<T: DeserializeOwned>(
        &self,
        name: &str,
        value: &str,
        now: i64,
    ) -> Result<T, SecureCookieError> {
        if value.len() > MAX_ENCODED_LEN {
            return Err(SecureCookieError::TooLong);
        }

        let raw = from_base64_url(value).map_err(|_| SecureCookieError::Base64)?;
        let envelope = std::str::from_utf8(&raw).map_err(|_| SecureCookieError::Malformed)?;

        let mut parts = envelope.splitn(3, '|');
        let (Some(timestamp), Some(payload), Some(mac)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(SecureCookieError::Malformed);
        };

        let mac = from_base64_url(mac).map_err(|_| SecureCookieError::Malformed)?;
        if !verify_hmac_sha256(
            &*self.hash_key,
            &[name.as_bytes(), b"|", timestamp.as_bytes(), b"|", payload.as_bytes()],
            &mac,
        ) {
            return Err(SecureCookieError::MacInvalid);
        }

        let issued_at: i64 = timestamp
            .parse()
            .map_err(|_| SecureCookieError::InvalidTimestamp)?;
        if issued_at < now.saturating_sub(self.max_age_secs) {
            return Err(SecureCookieError::Expired);
        }

        let sealed = from_base64_url(payload).map_err(|_| SecureCookieError::Malformed)?;
        if sealed.len() <= NONCE_LEN {
            return Err(SecureCookieError::Malformed);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

        let plaintext = Zeroizing::new(
            self.cipher()
                .decrypt(
                    Nonce::from_slice(nonce),
                    Payload {
                        msg: ciphertext,
                        aad: name.as_bytes(),
                    },
                )
                .map_err(|_| SecureCookieError::Decrypt)?,
        );

        serde_json::from_slice(&plaintext).map_err(|_| SecureCookieError::Deserialize)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.block_key.as_slice()))
    }
}

impl std::fmt::Debug for SecureCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureCookie")
            .field("hash_key", &"[REDACTED]")
            .field("block_key", &"[REDACTED]")
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}
