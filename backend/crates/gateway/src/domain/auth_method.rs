//! Auth Method Value Object
//!
//! The backend authentication method a credential belongs to.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Backend token used directly
    #[display("token")]
    Token,
    /// Username + password
    #[display("userpass")]
    Userpass,
    /// Username + password checked against LDAP
    #[display("ldap")]
    Ldap,
    /// GitHub personal access token
    #[display("github")]
    Github,
    /// Role ID + secret ID
    #[display("approle")]
    AppRole,
}

impl AuthMethod {
    /// Whether login needs a companion secret next to `id`
    #[inline]
    pub const fn requires_password(&self) -> bool {
        matches!(self, AuthMethod::Userpass | AuthMethod::Ldap | AuthMethod::AppRole)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported authentication type")]
pub struct UnsupportedAuthMethod;

impl FromStr for AuthMethod {
    type Err = UnsupportedAuthMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(AuthMethod::Token),
            "userpass" => Ok(AuthMethod::Userpass),
            "ldap" => Ok(AuthMethod::Ldap),
            "github" => Ok(AuthMethod::Github),
            "approle" => Ok(AuthMethod::AppRole),
            _ => Err(UnsupportedAuthMethod),
        }
    }
}
