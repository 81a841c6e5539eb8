//! Tests for the agent admin API client
//!
//! A small axum router stands in for the agent so the real HTTP path,
//! header handling and status mapping are exercised.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use core_kernel::{AdapterHealth, ExchangeId, HealthCheckable, PortError};
use domain_claims::{reconstruct_attributes, ProtocolEnginePort, VerifiedFlag};
use infra_agent::{AgentClient, AgentConfig, ProofApiVersion};
use test_utils::{EncounterFixtures, ExchangeRecordBuilder};

const API_KEY: &str = "secret-admin-key";

#[derive(Clone, Default)]
struct FakeAgent {
    verify_calls: Arc<AtomicUsize>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("X-API-Key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

async fn get_record(headers: HeaderMap, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    match id.as_str() {
        "ex-ok" => Ok(Json(
            ExchangeRecordBuilder::new("ex-ok")
                .with_attributes(&EncounterFixtures::inpatient_with_procedure("ENC-1"))
                .to_json(),
        )),
        "ex-garbled" => Ok(Json(json!("not a record"))),
        "ex-boom" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        "ex-slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Ok(Json(json!({})))
        }
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn verify(
    State(agent): State<FakeAgent>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    agent.verify_calls.fetch_add(1, Ordering::SeqCst);
    Ok(Json(json!({ "pres_ex_id": id, "state": "done", "verified": "true" })))
}

async fn live() -> Json<Value> {
    Json(json!({ "alive": true }))
}

async fn spawn_agent(agent: FakeAgent) -> SocketAddr {
    let router = Router::new()
        .route("/status/live", get(live))
        .route("/present-proof/records/:id", get(get_record))
        .route("/present-proof-2.0/records/:id/verify-presentation", post(verify))
        .with_state(agent);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, proof_api: ProofApiVersion, api_key: Option<&str>) -> AgentClient {
    AgentClient::new(AgentConfig {
        admin_url: format!("http://{addr}"),
        api_key: api_key.map(str::to_string),
        timeout_secs: 1,
        proof_api,
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetch_record_and_reconstruct() {
    let addr = spawn_agent(FakeAgent::default()).await;
    let client = client(addr, ProofApiVersion::V1, Some(API_KEY));

    let record = client.get_exchange_record(&ExchangeId::new("ex-ok")).await.unwrap();

    assert_eq!(record.verified, VerifiedFlag::True);
    let attrs = reconstruct_attributes(&record).unwrap();
    assert_eq!(attrs["encounter_id"], "ENC-1");
}

#[tokio::test]
async fn test_verify_presentation_v2() {
    let agent = FakeAgent::default();
    let addr = spawn_agent(agent.clone()).await;
    let client = client(addr, ProofApiVersion::V2, Some(API_KEY));

    let trigger = client.verify_presentation(&ExchangeId::new("ex-ok")).await.unwrap();

    assert_eq!(trigger.state.as_deref(), Some("done"));
    assert_eq!(trigger.verified, VerifiedFlag::True);
    assert_eq!(agent.verify_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_error_mapping() {
    let addr = spawn_agent(FakeAgent::default()).await;
    let client = client(addr, ProofApiVersion::V1, Some(API_KEY));

    let missing = client.get_exchange_record(&ExchangeId::new("ex-missing")).await.unwrap_err();
    assert!(missing.is_not_found());

    let boom = client.get_exchange_record(&ExchangeId::new("ex-boom")).await.unwrap_err();
    assert!(matches!(boom, PortError::ServiceUnavailable { .. }));

    let garbled = client.get_exchange_record(&ExchangeId::new("ex-garbled")).await.unwrap_err();
    assert!(matches!(garbled, PortError::Transformation { .. }));

    let slow = client.get_exchange_record(&ExchangeId::new("ex-slow")).await.unwrap_err();
    assert!(matches!(slow, PortError::Timeout { .. }));
}

#[tokio::test]
async fn test_missing_api_key_is_unauthorized() {
    let addr = spawn_agent(FakeAgent::default()).await;
    let client = client(addr, ProofApiVersion::V1, None);

    let error = client.get_exchange_record(&ExchangeId::new("ex-ok")).await.unwrap_err();

    assert!(matches!(error, PortError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_health_check() {
    let addr = spawn_agent(FakeAgent::default()).await;
    let healthy = client(addr, ProofApiVersion::V1, None).health_check().await;
    assert_eq!(healthy.status, AdapterHealth::Healthy);

    let unreachable = AgentClient::new(AgentConfig {
        admin_url: "http://127.0.0.1:1".to_string(),
        timeout_secs: 1,
        ..Default::default()
    })
    .unwrap()
    .health_check()
    .await;
    assert_eq!(unreachable.status, AdapterHealth::Unhealthy);
}
