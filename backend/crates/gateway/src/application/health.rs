//! Health Use Case

use std::sync::Arc;

use crate::domain::SecretsBackend;
use crate::error::GatewayResult;

pub struct HealthUseCase<B>
where
    B: SecretsBackend,
{
    backend: Arc<B>,
}

impl<B> HealthUseCase<B>
where
    B: SecretsBackend,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Backend status body, passed through untouched
    pub async fn execute(&self) -> GatewayResult<serde_json::Value> {
        Ok(self.backend.health().await?)
    }
}
