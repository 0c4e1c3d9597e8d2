//! In-memory secrets backend for tests

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use platform::crypto::{from_base64, to_base64};
use serde_json::json;
use zeroize::Zeroizing;

use crate::domain::{
    AuthInfo, AuthMethod, BackendError, BackendResult, LoginOutcome, RenewalData, SecretsBackend,
    TokenData,
};

const TRANSIT_KEY: &str = "gateway";
const MASK: u8 = 0x5a;

#[derive(Default)]
struct State {
    /// access token -> display name
    tokens: Mutex<HashMap<String, String>>,
    /// (method, id) -> (password, issued access token)
    users: Mutex<HashMap<(String, String), (String, String)>>,
    transit_failure: Mutex<Option<BackendError>>,
    login_calls: AtomicUsize,
    decrypt_calls: AtomicUsize,
}

/// Clones share state, so a test can keep a handle after handing one to
/// the router.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&self, token: &str, display_name: &str) {
        self.state
            .tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), display_name.to_string());
    }

    /// Register a password-style login; returns the token it will issue
    pub fn add_user(&self, method: AuthMethod, id: &str, password: &str) -> String {
        let token = format!("s.{method}-{id}");
        self.state.users.lock().unwrap().insert(
            (method.to_string(), id.to_string()),
            (password.to_string(), token.clone()),
        );
        self.add_token(&token, &format!("{method}-{id}"));
        token
    }

    pub fn revoke(&self, token: &str) {
        self.state.tokens.lock().unwrap().remove(token);
    }

    pub fn fail_transit(&self, err: BackendError) {
        *self.state.transit_failure.lock().unwrap() = Some(err);
    }

    pub fn login_calls(&self) -> usize {
        self.state.login_calls.load(Ordering::SeqCst)
    }

    pub fn decrypt_calls(&self) -> usize {
        self.state.decrypt_calls.load(Ordering::SeqCst)
    }

    fn denied() -> BackendError {
        BackendError::Rejected {
            code: 403,
            messages: vec!["permission denied".to_string()],
        }
    }

    fn token_data(token: &str, display_name: &str) -> TokenData {
        TokenData {
            display_name: display_name.to_string(),
            id: format!("accessor-{}", token.len()),
            meta: Some(BTreeMap::from([("team".to_string(), "ops".to_string())])),
            policies: vec!["default".to_string()],
            renewable: true,
            ttl: 3600,
        }
    }

    fn check_transit(&self, key_name: &str) -> BackendResult<()> {
        if let Some(err) = self.state.transit_failure.lock().unwrap().clone() {
            return Err(err);
        }
        if key_name != TRANSIT_KEY {
            return Err(BackendError::Rejected {
                code: 400,
                messages: vec!["encryption key not found".to_string()],
            });
        }
        Ok(())
    }
}

impl SecretsBackend for FakeBackend {
    async fn login(&self, auth: &AuthInfo) -> BackendResult<LoginOutcome> {
        self.state.login_calls.fetch_add(1, Ordering::SeqCst);

        let token = match auth.method() {
            AuthMethod::Token | AuthMethod::Github => auth.id().to_string(),
            method => {
                let users = self.state.users.lock().unwrap();
                match users.get(&(method.to_string(), auth.id().to_string())) {
                    Some((password, token)) if Some(password.as_str()) == auth.password() => {
                        token.clone()
                    }
                    _ => {
                        return Err(BackendError::Rejected {
                            code: 400,
                            messages: vec!["invalid username or password".to_string()],
                        });
                    }
                }
            }
        };

        let display_name = self
            .state
            .tokens
            .lock()
            .unwrap()
            .get(&token)
            .cloned()
            .ok_or_else(Self::denied)?;

        Ok(LoginOutcome {
            data: Self::token_data(&token, &display_name),
            client_token: Zeroizing::new(token),
        })
    }

    async fn renew_self(&self, auth: &AuthInfo) -> BackendResult<RenewalData> {
        let tokens = self.state.tokens.lock().unwrap();
        let display_name = tokens.get(auth.id()).ok_or_else(Self::denied)?;
        let data = Self::token_data(auth.id(), display_name);

        Ok(RenewalData {
            meta: data.meta,
            policies: data.policies,
            ttl: 7200,
        })
    }

    async fn health(&self) -> BackendResult<serde_json::Value> {
        Ok(json!({ "initialized": true, "sealed": false, "standby": false }))
    }

    async fn encrypt(&self, key_name: &str, plaintext: &[u8]) -> BackendResult<String> {
        self.check_transit(key_name)?;
        let masked: Vec<u8> = plaintext.iter().map(|b| b ^ MASK).collect();
        Ok(format!("vault:v1:{}", to_base64(&masked)))
    }

    async fn decrypt(&self, key_name: &str, ciphertext: &str) -> BackendResult<Zeroizing<Vec<u8>>> {
        self.state.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transit(key_name)?;

        let invalid = || BackendError::Rejected {
            code: 400,
            messages: vec!["invalid ciphertext".to_string()],
        };
        let encoded = ciphertext.strip_prefix("vault:v1:").ok_or_else(invalid)?;
        let masked = from_base64(encoded).map_err(|_| invalid())?;

        Ok(Zeroizing::new(masked.iter().map(|b| b ^ MASK).collect()))
    }
}
