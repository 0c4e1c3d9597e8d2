//! Gateway Error Types
//!
//! Gateway-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Every failure is recovered at the
//! handler boundary and rendered as `{"error": "<string>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use platform::csrf::CsrfError;
use platform::secure_cookie::SecureCookieError;
use thiserror::Error;

use crate::application::response_translator;
use crate::domain::BackendError;

/// Gateway-specific result type alias
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway-specific error variants
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Login body could not be parsed
    #[error("Invalid auth format")]
    InvalidAuthFormat,

    /// Login type or id (or a required password) is empty
    #[error("Empty authentication")]
    EmptyAuthentication,

    /// Login type is not a known auth method
    #[error("Unsupported authentication type")]
    UnsupportedAuthType,

    /// Neither token header nor session cookie present
    #[error("No credentials presented")]
    NotLoggedIn,

    /// Session cookie failed envelope decoding (tampered, expired, garbage)
    #[error("Session cookie rejected: {0}")]
    SessionRejected(#[from] SecureCookieError),

    /// Anti-forgery check failed
    #[error("CSRF check failed: {0}")]
    Csrf(#[from] CsrfError),

    /// Transit encryption of a fresh session token failed
    #[error("Transit encryption failed: {0}")]
    CipherUnavailable(BackendError),

    /// Envelope encoding of a fresh session failed
    #[error("Session cookie encoding failed: {0}")]
    CookieEncoding(SecureCookieError),

    /// Backend failure, translated by the response translator
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.to_app_error().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Convert to the client-facing AppError
    ///
    /// Envelope failures and missing credentials are indistinguishable to
    /// the client.
    pub fn to_app_error(&self) -> AppError {
        match self {
            GatewayError::InvalidAuthFormat
            | GatewayError::EmptyAuthentication
            | GatewayError::UnsupportedAuthType => AppError::bad_request(self.to_string()),
            GatewayError::NotLoggedIn | GatewayError::SessionRejected(_) => {
                AppError::forbidden("Please login first")
            }
            GatewayError::Csrf(_) => AppError::forbidden("Forbidden - CSRF token invalid"),
            GatewayError::CipherUnavailable(_) => AppError::internal("Could not use transit key"),
            GatewayError::CookieEncoding(_) => AppError::internal("Could not encode cookie"),
            GatewayError::Backend(err) => response_translator::translate(err),
            GatewayError::Internal(_) => AppError::internal("Internal error"),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            GatewayError::CipherUnavailable(e) => {
                tracing::error!(error = %e, "Transit key unusable while sealing session");
            }
            GatewayError::CookieEncoding(e) => {
                tracing::error!(error = %e, "Session cookie encoding failed");
            }
            GatewayError::Internal(msg) => {
                tracing::error!(message = %msg, "Gateway internal error");
            }
            GatewayError::SessionRejected(SecureCookieError::Expired) => {
                tracing::debug!("Expired session cookie");
            }
            GatewayError::SessionRejected(e) => {
                tracing::warn!(error = %e, "Session cookie rejected");
            }
            GatewayError::Csrf(e) => {
                tracing::warn!(error = %e, "CSRF check failed");
            }
            // Unrecognized backend failures are logged by the translator
            _ => {
                tracing::debug!(error = %self, "Gateway error");
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
