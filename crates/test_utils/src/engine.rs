//! Stub Protocol Engine
//!
//! In-process stand-in for the credential-exchange engine. Tests script the
//! record returned for each exchange, inject failures, and read call counters
//! afterwards.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use core_kernel::{
    AdapterHealth, DomainPort, ExchangeId, HealthCheckResult, HealthCheckable, PortError,
};
use domain_claims::{ExchangeRecord, ProtocolEnginePort, VerificationTrigger};

/// Scripted protocol engine
#[derive(Debug, Default)]
pub struct StubProtocolEngine {
    records: RwLock<HashMap<ExchangeId, ExchangeRecord>>,
    failing: RwLock<bool>,
    verify_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl StubProtocolEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the record returned for its exchange id
    pub async fn insert_record(&self, record: ExchangeRecord) {
        let exchange_id = record
            .exchange_id()
            .expect("stub records need an exchange id");
        self.records.write().await.insert(exchange_id, record);
    }

    /// Makes every subsequent call fail with a connection error
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.write().await = failing;
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    async fn check_failing(&self) -> Result<(), PortError> {
        if *self.failing.read().await {
            Err(PortError::connection("stub engine unreachable"))
        } else {
            Ok(())
        }
    }
}

impl DomainPort for StubProtocolEngine {}

#[async_trait]
impl HealthCheckable for StubProtocolEngine {
    async fn health_check(&self) -> HealthCheckResult {
        let status = if *self.failing.read().await {
            AdapterHealth::Unhealthy
        } else {
            AdapterHealth::Healthy
        };
        HealthCheckResult {
            adapter_id: "stub-engine".to_string(),
            status,
            latency_ms: 0,
            message: None,
            checked_at: chrono::Utc::now(),
        }
    }
}

#[async_trait]
impl ProtocolEnginePort for StubProtocolEngine {
    async fn verify_presentation(&self, exchange_id: &ExchangeId) -> Result<VerificationTrigger, PortError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing().await?;

        let records = self.records.read().await;
        let record = records
            .get(exchange_id)
            .ok_or_else(|| PortError::not_found("ExchangeRecord", exchange_id))?;
        Ok(VerificationTrigger {
            state: record.state.clone(),
            verified: record.verified,
        })
    }

    async fn get_exchange_record(&self, exchange_id: &ExchangeId) -> Result<ExchangeRecord, PortError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing().await?;

        self.records
            .read()
            .await
            .get(exchange_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("ExchangeRecord", exchange_id))
    }
}
