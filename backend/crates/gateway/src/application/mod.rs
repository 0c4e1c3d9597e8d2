//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod credential_cipher;
pub mod health;
pub mod login;
pub mod renew_self;
pub mod resolve_auth;
pub mod response_translator;
pub mod session_codec;

// Re-exports
pub use config::GatewayConfig;
pub use credential_cipher::CredentialCipher;
pub use health::HealthUseCase;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use renew_self::RenewSelfUseCase;
pub use resolve_auth::{AuthResolver, TOKEN_HEADER};
pub use session_codec::{SessionCodec, SessionKeys};
