//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations with no knowledge of
//! sessions or credentials:
//! - Cryptographic utilities (HMAC-SHA256, Base64, secure random keys)
//! - Cookie header management
//! - Authenticated-encryption cookie envelope
//! - CSRF token source

pub mod cookie;
pub mod crypto;
pub mod csrf;
pub mod secure_cookie;
