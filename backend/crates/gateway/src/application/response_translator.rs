//! Response Translator
//!
//! Maps backend failures to client-facing errors. A rejection with a usable
//! status code and message keeps the backend's status; anything else becomes
//! a generic 500 and the detail goes to the server log only.

use kernel::error::{app_error::AppError, kind::ErrorKind};

use crate::domain::BackendError;

/// Body message for backend failures that cannot be mapped
pub const INVALID_BACKEND_RESPONSE: &str = "Invalid backend response";

/// Translate a typed backend failure
pub fn translate(err: &BackendError) -> AppError {
    if let BackendError::Rejected { code, messages } = err {
        let message = messages.iter().map(|m| m.trim()).find(|m| !m.is_empty());
        if let (Some(kind), Some(message)) = (ErrorKind::from_upstream(*code), message) {
            return AppError::new(kind, format!("Backend: {message}"));
        }
    }

    tracing::error!(error = %err, "Unrecognized backend failure");
    AppError::internal(INVALID_BACKEND_RESPONSE)
}

/// Translate the textual `Code:` / `*` error shape
pub fn translate_text(text: &str) -> AppError {
    translate(&BackendError::from_error_text(text))
}
