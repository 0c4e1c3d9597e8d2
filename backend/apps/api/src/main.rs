//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but request-level
//! errors go through `gateway::GatewayError`.

use anyhow::Context;
use axum::{
    Router, http,
    http::{HeaderName, Method, header},
};
use gateway::{GatewayConfig, SessionKeys, VaultClient, gateway_router};
use platform::csrf::{CSRF_HEADER, CsrfTokenSource};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer, ExposeHeaders};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Read a boolean flag; unset means `default`
fn env_flag(name: &str, default: bool) -> anyhow::Result<bool> {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("{name} must be a boolean, got {other:?}"),
        },
        Err(_) => Ok(default),
    }
}

fn load_config() -> anyhow::Result<GatewayConfig> {
    let mut config = GatewayConfig::default();

    if let Ok(addr) = env::var("VAULT_ADDR") {
        config.backend_addr = addr;
    }

    let token = env::var("VAULT_TOKEN").context("VAULT_TOKEN must be set in environment")?;
    config = config.with_server_token(token);

    if let Ok(key) = env::var("GATEWAY_TRANSIT_KEY") {
        config.transit_key = key;
    }

    if let Ok(secs) = env::var("GATEWAY_BACKEND_TIMEOUT_SECS") {
        let secs: u64 = secs
            .parse()
            .context("GATEWAY_BACKEND_TIMEOUT_SECS must be a number of seconds")?;
        config.backend_timeout = Duration::from_secs(secs);
    }

    config.set_cookie_secure(env_flag("GATEWAY_COOKIE_SECURE", !cfg!(debug_assertions))?);
    config.csrf_enabled = env_flag("GATEWAY_CSRF_ENABLED", true)?;

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;

    if !config.session_cookie.secure {
        tracing::warn!("Session cookies are sent without the Secure attribute");
    }
    if !config.csrf_enabled {
        tracing::warn!("CSRF enforcement is disabled");
    }

    let client = VaultClient::new(&config).context("Failed to create backend client")?;

    tracing::info!(
        backend = %config.backend_addr,
        transit_key = %config.transit_key,
        "Backend client ready"
    );

    // Session and CSRF keys live only in this process
    let keys = SessionKeys::generate();
    let csrf = CsrfTokenSource::generate();

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8000,http://127.0.0.1:8000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let csrf_header = HeaderName::from_static(CSRF_HEADER);
    let token_header = HeaderName::from_static(gateway::application::TOKEN_HEADER);

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            csrf_header.clone(),
            token_header,
        ]))
        .expose_headers(ExposeHeaders::list([csrf_header]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", gateway_router(client, config, keys, csrf))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("GATEWAY_BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
        .parse()
        .context("GATEWAY_BIND_ADDR must be host:port")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
