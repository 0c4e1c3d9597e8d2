//! Shared Kernel - Gateway-wide error vocabulary
//!
//! This crate contains the smallest core that every other crate agrees on:
//! - [`error::kind::ErrorKind`] - classification mapped to HTTP status codes
//! - [`error::app_error::AppError`] - the unified, client-facing error
//! - axum response rendering (feature `axum`)
//!
//! Client-facing error bodies always have the shape `{"error": "<string>"}`.

pub mod error {
    pub mod app_error;
    pub mod kind;
    #[cfg(feature = "axum")]
    pub mod response;
}
