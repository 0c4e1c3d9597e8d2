//! Session & Credential Gateway
//!
//! Clean Architecture structure:
//! - `domain/` - AuthInfo typestate, auth methods, secrets backend port
//! - `application/` - Use cases, session codec, credential cipher, resolver
//! - `infra/` - Vault HTTP client
//! - `presentation/` - HTTP handlers, DTOs, CSRF middleware, router
//!
//! ## Security Model
//! - The browser only ever holds an encrypted, MAC'd envelope of
//!   `{type, id}` where `id` is itself transit-encrypted by the backend
//! - The gateway never holds the transit key and never persists sessions
//! - Session lifetime is absolute (8 hours from login); envelope keys live
//!   only in process memory, so a restart logs everyone out
//! - Plaintext credentials are wiped from memory when they go out of scope

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::GatewayConfig;
pub use application::session_codec::{SessionCodec, SessionKeys};
pub use error::{GatewayError, GatewayResult};
pub use infra::vault::VaultClient;
pub use presentation::router::{gateway_router, gateway_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};

#[cfg(test)]
mod test_support;
