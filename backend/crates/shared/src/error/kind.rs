//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to HTTP status codes.

/// エラー種別の列挙体
///
/// HTTP ステータスコードに対応するエラー分類を定義します。
/// バックエンドが返したステータスをそのまま中継する場合は
/// [`ErrorKind::Upstream`] を使用します。
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::Forbidden.status_code(), 403);
/// assert_eq!(ErrorKind::Upstream(400).status_code(), 400);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - Bad Request: リクエストが不正
    BadRequest,
    /// 403 - Forbidden: アクセス権限なし（未ログインを含む）
    Forbidden,
    /// 500 - Internal Server Error: サーバー内部エラー
    InternalServerError,
    /// 上流サービス（シークレット管理バックエンド）が決定したステータス
    Upstream(u16),
}

impl ErrorKind {
    /// HTTP ステータスコードを取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::BadRequest.status_code(), 400);
    /// assert_eq!(ErrorKind::Upstream(503).status_code(), 503);
    /// ```
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::InternalServerError => 500,
            ErrorKind::Upstream(code) => *code,
        }
    }

    /// 標準的な理由フレーズ（ログ用）
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::Upstream(_) => "Upstream Error",
        }
    }

    /// 上流のステータスコードから種別を作成
    ///
    /// HTTP のエラーレンジ（400〜599）外のコードは `None` を返します。
    pub const fn from_upstream(code: u16) -> Option<Self> {
        if code >= 400 && code <= 599 {
            Some(ErrorKind::Upstream(code))
        } else {
            None
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Upstream(code) => write!(f, "Upstream Error ({code})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
