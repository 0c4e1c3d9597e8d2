//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::{RenewalData, TokenData};

// ============================================================================
// Common
// ============================================================================

/// `{"status": "..."}`
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

// ============================================================================
// Login
// ============================================================================

/// Login request
///
/// Missing fields deserialize as empty so they are reported as
/// "Empty authentication" rather than a format error.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct LoginRequest {
    #[serde(rename = "type", default)]
    pub auth_type: String,
    #[serde(default)]
    pub id: String,
    /// Password or AppRole secret ID
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("auth_type", &self.auth_type)
            .field("id", &"[REDACTED]")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Login response
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub data: TokenData,
}

// ============================================================================
// Renew Self
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RenewSelfResponse {
    pub data: RenewalData,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub result: serde_json::Value,
}
