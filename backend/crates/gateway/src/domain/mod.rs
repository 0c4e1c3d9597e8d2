//! Domain Layer
//!
//! Contains the credential entity, auth methods, and the backend port.

pub mod auth_info;
pub mod auth_method;
pub mod backend;

// Re-exports
pub use auth_info::{AuthInfo, RenewalData, SealedAuthInfo, TokenData};
pub use auth_method::AuthMethod;
pub use backend::{BackendError, BackendResult, LoginOutcome, SecretsBackend};
