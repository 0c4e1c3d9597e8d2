//! Infrastructure Layer
//!
//! Secrets backend implementations.

pub mod vault;

pub use vault::VaultClient;
