//! Application Configuration
//!
//! Configuration for the gateway application layer.

use std::fmt;
use std::time::Duration;

use zeroize::Zeroizing;

/// Re-export cookie settings from platform
pub use platform::cookie::{CookieConfig, SameSite};

/// Session cookie name
pub const SESSION_COOKIE_NAME: &str = "auth";

/// CSRF base secret cookie name
pub const CSRF_COOKIE_NAME: &str = "_gateway_csrf";

/// Absolute session lifetime (8 hours)
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(8 * 3600);

/// CSRF base secret lifetime (12 hours)
pub const CSRF_MAX_AGE: Duration = Duration::from_secs(12 * 3600);

/// Gateway application configuration
#[derive(Clone)]
pub struct GatewayConfig {
    /// Backend base URL, e.g. `http://127.0.0.1:8200`
    pub backend_addr: String,
    /// The gateway's own token, used for transit encrypt/decrypt
    pub server_token: Zeroizing<String>,
    /// Transit key name used to seal session tokens
    pub transit_key: String,
    /// Per-request timeout for backend calls
    pub backend_timeout: Duration,
    /// Session cookie settings
    pub session_cookie: CookieConfig,
    /// Absolute session lifetime enforced by the envelope
    pub session_max_age: Duration,
    /// Reject unsafe methods without a valid CSRF token
    pub csrf_enabled: bool,
    /// CSRF base secret cookie settings
    pub csrf_cookie: CookieConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend_addr: "http://127.0.0.1:8200".to_string(),
            server_token: Zeroizing::new(String::new()),
            transit_key: "gateway".to_string(),
            backend_timeout: Duration::from_secs(10),
            session_cookie: CookieConfig {
                name: SESSION_COOKIE_NAME.to_string(),
                max_age_secs: Some(SESSION_MAX_AGE.as_secs() as i64),
                ..Default::default()
            },
            session_max_age: SESSION_MAX_AGE,
            csrf_enabled: true,
            csrf_cookie: CookieConfig {
                name: CSRF_COOKIE_NAME.to_string(),
                max_age_secs: Some(CSRF_MAX_AGE.as_secs() as i64),
                ..Default::default()
            },
        }
    }
}

impl GatewayConfig {
    /// Create config for development (insecure cookies)
    pub fn development() -> Self {
        let mut config = Self::default();
        config.set_cookie_secure(false);
        config
    }

    pub fn with_server_token(mut self, token: impl Into<String>) -> Self {
        self.server_token = Zeroizing::new(token.into());
        self
    }

    /// Toggle the `Secure` attribute on every cookie the gateway sets
    pub fn set_cookie_secure(&mut self, secure: bool) {
        self.session_cookie.secure = secure;
        self.csrf_cookie.secure = secure;
    }

    pub fn session_cookie_name(&self) -> &str {
        &self.session_cookie.name
    }

    pub fn csrf_cookie_name(&self) -> &str {
        &self.csrf_cookie.name
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("backend_addr", &self.backend_addr)
            .field("server_token", &"[REDACTED]")
            .field("transit_key", &self.transit_key)
            .field("backend_timeout", &self.backend_timeout)
            .field("session_cookie", &self.session_cookie)
            .field("session_max_age", &self.session_max_age)
            .field("csrf_enabled", &self.csrf_enabled)
            .field("csrf_cookie", &self.csrf_cookie)
            .finish()
    }
}
