//! Application Error - Unified error type for the gateway
//!
//! Defines the [`AppError`] struct.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// ゲートウェイ統一エラー型
///
/// HTTP 境界でクライアントに返すエラーです。`message` はそのまま
/// `{"error": "<message>"}` としてクライアントに送られるため、
/// 秘匿値や上流の内部情報を含めてはいけません。詳細はサーバー側の
/// ログにのみ出力します。
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::Forbidden, "Please login first");
/// assert_eq!(err.status_code(), 403);
/// ```
#[derive(Debug)]
pub struct AppError {
    /// エラー種別
    kind: ErrorKind,
    /// クライアント向けメッセージ
    message: Cow<'static, str>,
}

impl AppError {
    /// 新しいエラーを作成
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 400 Bad Request エラー
    #[inline]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// 403 Forbidden エラー
    #[inline]
    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// 500 Internal Server Error
    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    /// HTTP ステータスコードを取得
    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// クライアント向けメッセージを取得
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_error() {
        let err = AppError::new(ErrorKind::Forbidden, "Please login first");
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "Please login first");
    }

    #[test]
    fn test_convenience_constructors() {
        assert_eq!(AppError::bad_request("test").status_code(), 400);
        assert_eq!(AppError::forbidden("test").status_code(), 403);
        assert_eq!(AppError::internal("test").status_code(), 500);
    }

    #[test]
    fn test_upstream_kind() {
        let err = AppError::new(ErrorKind::Upstream(404), "Backend: not found");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_display() {
        let err = AppError::forbidden("Please login first");
        assert_eq!(err.to_string(), "[Forbidden] Please login first");
    }
}
