//! Vault HTTP Backend
//!
//! [`SecretsBackend`] over the Vault HTTP API. Logins are followed by a
//! `lookup-self` with the issued token so every method yields the same
//! metadata shape.

use std::collections::BTreeMap;

use platform::crypto::{from_base64, to_base64};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::application::config::GatewayConfig;
use crate::application::resolve_auth::TOKEN_HEADER;
use crate::domain::{
    AuthInfo, AuthMethod, BackendError, BackendResult, LoginOutcome, RenewalData, SecretsBackend,
    TokenData,
};

/// Make every health state answer 2xx so the body can be passed through
const HEALTH_QUERY: &[(&str, &str)] = &[
    ("standbycode", "299"),
    ("sealedcode", "299"),
    ("uninitcode", "299"),
    ("drsecondarycode", "299"),
    ("performancestandbycode", "299"),
];

// ============================================================================
// Wire types
// ============================================================================

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct AuthEnvelope<T> {
    auth: T,
}

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
struct ClientToken {
    client_token: String,
}

#[derive(Deserialize)]
struct LookupSelf {
    #[serde(default)]
    accessor: String,
    #[serde(default)]
    display_name: String,
    meta: Option<BTreeMap<String, String>>,
    #[serde(default)]
    policies: Vec<String>,
    #[serde(default)]
    renewable: bool,
    #[serde(default)]
    ttl: u64,
}

#[derive(Deserialize)]
struct RenewSelf {
    metadata: Option<BTreeMap<String, String>>,
    #[serde(default)]
    policies: Vec<String>,
    #[serde(default)]
    lease_duration: u64,
}

#[derive(Serialize)]
struct PasswordLogin<'a> {
    password: &'a str,
}

#[derive(Serialize)]
struct GithubLogin<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct AppRoleLogin<'a> {
    role_id: &'a str,
    secret_id: &'a str,
}

#[derive(Serialize)]
struct EncryptRequest<'a> {
    plaintext: &'a str,
}

#[derive(Deserialize)]
struct EncryptResponse {
    ciphertext: String,
}

#[derive(Serialize)]
struct DecryptRequest<'a> {
    ciphertext: &'a str,
}

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
struct DecryptResponse {
    plaintext: String,
}

// ============================================================================
// Client
// ============================================================================

/// Vault API client
#[derive(Clone)]
pub struct VaultClient {
    http: Client,
    base: Url,
    server_token: Zeroizing<String>,
}

impl VaultClient {
    pub fn new(config: &GatewayConfig) -> BackendResult<Self> {
        let base = Url::parse(&config.backend_addr).map_err(|e| {
            BackendError::Transport(format!("invalid backend address {}: {e}", config.backend_addr))
        })?;
        if base.cannot_be_a_base() {
            return Err(BackendError::Transport(format!(
                "invalid backend address {}",
                config.backend_addr
            )));
        }

        let http = Client::builder()
            .timeout(config.backend_timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base,
            server_token: config.server_token.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base addresses
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("v1").extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> BackendResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let messages = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.errors)
                .unwrap_or_default();

            tracing::debug!(status = status.as_u16(), "Backend rejected request");
            return Err(BackendError::Rejected {
                code: status.as_u16(),
                messages,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))
    }

    async fn lookup_self(&self, token: &str) -> BackendResult<TokenData> {
        let request = self
            .http
            .get(self.url(&["auth", "token", "lookup-self"]))
            .header(TOKEN_HEADER, token);

        let DataEnvelope { data } = self.send::<DataEnvelope<LookupSelf>>(request).await?;

        Ok(TokenData {
            display_name: data.display_name,
            id: data.accessor,
            meta: data.meta,
            policies: data.policies,
            renewable: data.renewable,
            ttl: data.ttl,
        })
    }

    async fn method_login(&self, auth: &AuthInfo) -> BackendResult<Zeroizing<String>> {
        let password = auth.password().unwrap_or_default();

        let request = match auth.method() {
            AuthMethod::Userpass | AuthMethod::Ldap => {
                let mount = auth.method().to_string();
                self.http
                    .post(self.url(&["auth", &mount, "login", auth.id()]))
                    .json(&PasswordLogin { password })
            }
            AuthMethod::Github => self
                .http
                .post(self.url(&["auth", "github", "login"]))
                .json(&GithubLogin { token: auth.id() }),
            AuthMethod::AppRole => self
                .http
                .post(self.url(&["auth", "approle", "login"]))
                .json(&AppRoleLogin {
                    role_id: auth.id(),
                    secret_id: password,
                }),
            AuthMethod::Token => return Ok(Zeroizing::new(auth.id().to_string())),
        };

        let AuthEnvelope { auth: issued } = self.send::<AuthEnvelope<ClientToken>>(request).await?;

        Ok(Zeroizing::new(issued.client_token.clone()))
    }
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("base", &self.base.as_str())
            .field("server_token", &"[REDACTED]")
            .finish()
    }
}

impl SecretsBackend for VaultClient {
    async fn login(&self, auth: &AuthInfo) -> BackendResult<LoginOutcome> {
        let client_token = self.method_login(auth).await?;
        let data = self.lookup_self(&client_token).await?;

        Ok(LoginOutcome { client_token, data })
    }

    async fn renew_self(&self, auth: &AuthInfo) -> BackendResult<RenewalData> {
        let request = self
            .http
            .post(self.url(&["auth", "token", "renew-self"]))
            .header(TOKEN_HEADER, auth.id());

        let AuthEnvelope { auth: renewed } = self.send::<AuthEnvelope<RenewSelf>>(request).await?;

        Ok(RenewalData {
            meta: renewed.metadata,
            policies: renewed.policies,
            ttl: renewed.lease_duration,
        })
    }

    async fn health(&self) -> BackendResult<serde_json::Value> {
        let request = self
            .http
            .get(self.url(&["sys", "health"]))
            .query(HEALTH_QUERY);

        self.send(request).await
    }

    async fn encrypt(&self, key_name: &str, plaintext: &[u8]) -> BackendResult<String> {
        let encoded = Zeroizing::new(to_base64(plaintext));
        let request = self
            .http
            .post(self.url(&["transit", "encrypt", key_name]))
            .header(TOKEN_HEADER, self.server_token.as_str())
            .json(&EncryptRequest {
                plaintext: &encoded,
            });

        let DataEnvelope { data } = self.send::<DataEnvelope<EncryptResponse>>(request).await?;

        Ok(data.ciphertext)
    }

    async fn decrypt(&self, key_name: &str, ciphertext: &str) -> BackendResult<Zeroizing<Vec<u8>>> {
        let request = self
            .http
            .post(self.url(&["transit", "decrypt", key_name]))
            .header(TOKEN_HEADER, self.server_token.as_str())
            .json(&DecryptRequest { ciphertext });

        let DataEnvelope { data } = self.send::<DataEnvelope<DecryptResponse>>(request).await?;

        from_base64(&data.plaintext)
            .map(Zeroizing::new)
            .map_err(|_| BackendError::Malformed("transit plaintext is not base64".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> VaultClient {
        let config = GatewayConfig {
            backend_addr: server.uri(),
            server_token: Zeroizing::new("s.server".to_string()),
            backend_timeout: Duration::from_millis(500),
            ..GatewayConfig::default()
        };
        VaultClient::new(&config).unwrap()
    }

    fn lookup_body(display_name: &str) -> serde_json::Value {
        json!({
            "data": {
                "accessor": "acc-123",
                "display_name": display_name,
                "id": "s.should-not-be-used",
                "meta": { "team": "ops" },
                "policies": ["default", "ops"],
                "renewable": true,
                "ttl": 2764800
            }
        })
    }

    async fn mount_lookup(server: &MockServer, token: &str, display_name: &str) {
        Mock::given(method("GET"))
            .and(path("/v1/auth/token/lookup-self"))
            .and(header("x-vault-token", token))
            .respond_with(ResponseTemplate::new(200).set_body_json(lookup_body(display_name)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_token_login_uses_lookup_self() {
        let server = MockServer::start().await;
        mount_lookup(&server, "s.alice", "token-alice").await;

        let outcome = client(&server)
            .login(&AuthInfo::token("s.alice"))
            .await
            .unwrap();

        assert_eq!(outcome.client_token.as_str(), "s.alice");
        assert_eq!(outcome.data.display_name, "token-alice");
        assert_eq!(outcome.data.id, "acc-123");
        assert_eq!(outcome.data.policies, vec!["default", "ops"]);
        assert_eq!(outcome.data.ttl, 2764800);
        assert!(outcome.data.renewable);
        assert_eq!(
            outcome.data.meta.unwrap().get("team").map(String::as_str),
            Some("ops")
        );
    }

    #[tokio::test]
    async fn test_userpass_login_then_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/userpass/login/bob"))
            .and(body_json(json!({ "password": "hunter22" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "auth": { "client_token": "s.issued", "accessor": "acc-123" }
            })))
            .mount(&server)
            .await;
        mount_lookup(&server, "s.issued", "userpass-bob").await;

        let auth = AuthInfo::new(AuthMethod::Userpass, "bob").with_password("hunter22");
        let outcome = client(&server).login(&auth).await.unwrap();

        assert_eq!(outcome.client_token.as_str(), "s.issued");
        assert_eq!(outcome.data.display_name, "userpass-bob");
    }

    #[tokio::test]
    async fn test_approle_login_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/approle/login"))
            .and(body_json(json!({ "role_id": "role", "secret_id": "secret" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "auth": { "client_token": "s.approle" }
            })))
            .mount(&server)
            .await;
        mount_lookup(&server, "s.approle", "approle").await;

        let auth = AuthInfo::new(AuthMethod::AppRole, "role").with_password("secret");
        let outcome = client(&server).login(&auth).await.unwrap();
        assert_eq!(outcome.client_token.as_str(), "s.approle");
    }

    #[tokio::test]
    async fn test_error_body_becomes_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/auth/token/lookup-self"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "errors": ["permission denied"] })),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .login(&AuthInfo::token("s.bad"))
            .await
            .err()
            .unwrap();
        assert_eq!(
            err,
            BackendError::Rejected {
                code: 403,
                messages: vec!["permission denied".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_error_has_no_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/token/renew-self"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .renew_self(&AuthInfo::token("s.alice"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::Rejected {
                code: 502,
                messages: vec![],
            }
        );
    }

    #[tokio::test]
    async fn test_renew_self() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/token/renew-self"))
            .and(header("x-vault-token", "s.alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "auth": {
                    "client_token": "s.alice",
                    "policies": ["default"],
                    "metadata": null,
                    "lease_duration": 3600,
                    "renewable": true
                }
            })))
            .mount(&server)
            .await;

        let data = client(&server)
            .renew_self(&AuthInfo::token("s.alice"))
            .await
            .unwrap();
        assert_eq!(data.policies, vec!["default"]);
        assert_eq!(data.ttl, 3600);
        assert!(data.meta.is_none());
    }

    #[tokio::test]
    async fn test_health_passthrough() {
        let server = MockServer::start().await;
        let body = json!({ "initialized": true, "sealed": false, "standby": true });
        Mock::given(method("GET"))
            .and(path("/v1/sys/health"))
            .and(query_param("standbycode", "299"))
            .respond_with(ResponseTemplate::new(299).set_body_json(body.clone()))
            .mount(&server)
            .await;

        assert_eq!(client(&server).health().await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_transit_uses_server_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transit/encrypt/gateway"))
            .and(header("x-vault-token", "s.server"))
            .and(body_json(json!({ "plaintext": to_base64(b"s.alice") })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "ciphertext": "vault:v1:abc" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/transit/decrypt/gateway"))
            .and(header("x-vault-token", "s.server"))
            .and(body_json(json!({ "ciphertext": "vault:v1:abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "plaintext": to_base64(b"s.alice") }
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let ciphertext = client.encrypt("gateway", b"s.alice").await.unwrap();
        assert_eq!(ciphertext, "vault:v1:abc");

        let plaintext = client.decrypt("gateway", &ciphertext).await.unwrap();
        assert_eq!(plaintext.as_slice(), b"s.alice");
    }

    #[tokio::test]
    async fn test_unexpected_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transit/encrypt/gateway"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .mount(&server)
            .await;

        let err = client(&server)
            .encrypt("gateway", b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/sys/health"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client(&server).health().await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }

    #[test]
    fn test_invalid_address() {
        let config = GatewayConfig {
            backend_addr: "not a url".to_string(),
            ..GatewayConfig::default()
        };
        assert!(matches!(
            VaultClient::new(&config),
            Err(BackendError::Transport(_))
        ));
    }

    #[test]
    fn test_url_keeps_base_path_and_escapes_segments() {
        let config = GatewayConfig {
            backend_addr: "http://vault.internal:8200/".to_string(),
            ..GatewayConfig::default()
        };
        let client = VaultClient::new(&config).unwrap();
        assert_eq!(
            client.url(&["auth", "userpass", "login", "a/b"]).as_str(),
            "http://vault.internal:8200/v1/auth/userpass/login/a%2Fb"
        );
    }
}
