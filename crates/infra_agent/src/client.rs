//! Agent admin API client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::debug;

use core_kernel::{
    AdapterHealth, DomainPort, ExchangeId, HealthCheckResult, HealthCheckable, PortError,
};
use domain_claims::{ExchangeRecord, ProtocolEnginePort, VerificationTrigger};

use crate::config::AgentConfig;
use crate::error::AgentError;

const ADAPTER_ID: &str = "agent-admin-api";

/// HTTP client for the agent admin API
#[derive(Debug, Clone)]
pub struct AgentClient {
    client: Client,
    config: AgentConfig,
}

impl AgentClient {
    /// Creates a client; every request is bounded by `config.timeout_secs`
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Returns the base URL of the admin API
    pub fn admin_url(&self) -> &str {
        self.config.admin_url.trim_end_matches('/')
    }

    fn record_url(&self, exchange_id: &ExchangeId) -> String {
        format!(
            "{}{}/{}",
            self.admin_url(),
            self.config.proof_api.records_path(),
            exchange_id
        )
    }

    fn timeout_ms(&self) -> u64 {
        self.config.timeout_secs.saturating_mul(1000)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("X-API-Key", key),
            None => request,
        }
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Response, AgentError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| AgentError::from_request(operation, self.timeout_ms(), e))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AgentError::Status {
                operation,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    async fn decode<T: DeserializeOwned>(&self, operation: &'static str, response: Response) -> Result<T, AgentError> {
        response
            .json::<T>()
            .await
            .map_err(|e| AgentError::from_request(operation, self.timeout_ms(), e))
    }
}

impl DomainPort for AgentClient {}

#[async_trait]
impl HealthCheckable for AgentClient {
    /// Probes the agent's liveness endpoint
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let url = format!("{}/status/live", self.admin_url());

        let (status, message) = match self.send("status_live", self.client.get(&url)).await {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(AgentError::Status { status, .. }) if status < 500 => {
                (AdapterHealth::Degraded, Some(format!("liveness returned {status}")))
            }
            Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms: start.elapsed().as_millis() as u64,
            message,
            checked_at: chrono::Utc::now(),
        }
    }
}

#[async_trait]
impl ProtocolEnginePort for AgentClient {
    async fn verify_presentation(&self, exchange_id: &ExchangeId) -> Result<VerificationTrigger, PortError> {
        const OPERATION: &str = "verify_presentation";
        let url = format!("{}/verify-presentation", self.record_url(exchange_id));
        debug!(exchange_id = %exchange_id, url = %url, "requesting verification");

        let response = self
            .send(OPERATION, self.client.post(&url).json(&serde_json::json!({})))
            .await?;
        Ok(self.decode(OPERATION, response).await?)
    }

    async fn get_exchange_record(&self, exchange_id: &ExchangeId) -> Result<ExchangeRecord, PortError> {
        const OPERATION: &str = "get_exchange_record";
        let url = self.record_url(exchange_id);
        debug!(exchange_id = %exchange_id, url = %url, "fetching exchange record");

        let response = self.send(OPERATION, self.client.get(&url)).await?;
        Ok(self.decode(OPERATION, response).await?)
    }
}
