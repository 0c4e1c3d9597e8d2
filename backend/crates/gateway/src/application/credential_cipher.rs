//! Credential Cipher
//!
//! Seals and unseals the `id` of an [`AuthInfo`] with the backend's transit
//! key. The gateway never holds that key; failures are returned as-is and
//! never fall back to plaintext.

use std::sync::Arc;

use crate::domain::{AuthInfo, BackendError, BackendResult, SealedAuthInfo, SecretsBackend};

pub struct CredentialCipher<B>
where
    B: SecretsBackend,
{
    backend: Arc<B>,
    key_name: String,
}

impl<B> CredentialCipher<B>
where
    B: SecretsBackend,
{
    pub fn new(backend: Arc<B>, key_name: impl Into<String>) -> Self {
        Self {
            backend,
            key_name: key_name.into(),
        }
    }

    /// Replace `id` with its ciphertext
    ///
    /// Takes the plaintext by value: it is wiped when this returns, whether
    /// or not encryption succeeded.
    pub async fn encrypt(&self, auth: AuthInfo) -> BackendResult<SealedAuthInfo> {
        let ciphertext = self
            .backend
            .encrypt(&self.key_name, auth.id().as_bytes())
            .await?;

        Ok(SealedAuthInfo::new(auth.method(), ciphertext))
    }

    /// Recover the plaintext `id`
    pub async fn decrypt(&self, sealed: SealedAuthInfo) -> BackendResult<AuthInfo> {
        let plaintext = self
            .backend
            .decrypt(&self.key_name, sealed.ciphertext())
            .await?;

        let id = std::str::from_utf8(&plaintext)
            .map_err(|_| BackendError::Malformed("decrypted credential is not UTF-8".to_string()))?;

        Ok(AuthInfo::new(sealed.method(), id))
    }
}
