//! Integration tests for the HTTP surface
//!
//! The router runs against the in-memory store and a scripted protocol
//! engine; webhook processing goes through the real worker queue.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use domain_claims::InMemoryClaimStore;
use interface_api::{config::ApiConfig, create_router, AppState};
use test_utils::{EncounterFixtures, ExchangeRecordBuilder, StubProtocolEngine, WebhookFixtures};

struct TestApp {
    server: TestServer,
    engine: Arc<StubProtocolEngine>,
    store: Arc<InMemoryClaimStore>,
}

impl TestApp {
    fn new() -> Self {
        let engine = Arc::new(StubProtocolEngine::new());
        let store = Arc::new(InMemoryClaimStore::default());
        let config = ApiConfig {
            default_policy_id: "POL-DEFAULT".to_string(),
            ..Default::default()
        };

        let (state, _worker) = AppState::new(config, engine.clone(), store.clone());
        let server = TestServer::new(create_router(state)).unwrap();

        Self { server, engine, store }
    }

    /// Registers a verified exchange carrying `attrs`
    async fn verified_exchange(&self, exchange_id: &str, attrs: &domain_claims::FlatAttributes) {
        let record = ExchangeRecordBuilder::new(exchange_id).with_attributes(attrs).build();
        self.engine.insert_record(record).await;
    }

    async fn deliver(&self, topic: &str, body: Value) {
        self.server
            .post(&format!("/webhooks/topic/{topic}"))
            .json(&body)
            .await
            .assert_status_ok();
    }

    /// Waits until the worker has stored `count` claims
    async fn wait_for_claims(&self, count: usize) {
        for _ in 0..100 {
            if self.store.len().await >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("expected {count} claims, found {}", self.store.len().await);
    }

    /// Waits until the engine has served `count` record fetches
    async fn wait_for_fetches(&self, count: usize) {
        for _ in 0..100 {
            if self.engine.fetch_calls() >= count {
                // Give the handler a moment to finish after the fetch
                tokio::time::sleep(Duration::from_millis(50)).await;
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("expected {count} record fetches, saw {}", self.engine.fetch_calls());
    }
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_check_follows_agent_health() {
    let app = TestApp::new();

    let response = app.server.get("/health/ready").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ready");

    app.engine.set_failing(true).await;
    let response = app.server.get("/health/ready").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>()["status"], "unavailable");
}

// ============ Webhook Endpoint Tests ============

#[tokio::test]
async fn test_verified_webhook_creates_claim() {
    let app = TestApp::new();
    app.verified_exchange("ex-1", &EncounterFixtures::inpatient_with_procedure("ENC-1"))
        .await;

    let response = app
        .server
        .post("/webhooks/topic/present_proof")
        .json(&WebhookFixtures::verified_event("ex-1"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "ok": true }));

    app.wait_for_claims(1).await;

    let body: Value = app.server.get("/claims/CLAIM-000001").await.json();
    assert_eq!(body["ok"], true);
    let claim = &body["claim"];
    assert_eq!(claim["claimId"], "CLAIM-000001");
    assert_eq!(claim["status"], "RECEIVED");
    assert_eq!(claim["insuredId"], "INS-100");
    assert_eq!(claim["policyId"], "POL-100");
    assert_eq!(claim["encounterDTO"]["encounterId"], "ENC-1");
    assert_eq!(claim["encounterDTO"]["encounterClass"], "INPATIENT");
    assert_eq!(claim["credentialAttrs"]["hospital_id"], "HOSP-001");
    assert_eq!(claim["preview"]["eligible"], true);
    assert_eq!(claim["preview"]["totalPayout"], 5 * 100_000 + 300_000);
    assert_eq!(claim["preview"]["breakdown"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_redelivered_webhook_yields_single_claim() {
    let app = TestApp::new();
    app.verified_exchange("ex-dup", &EncounterFixtures::inpatient_with_procedure("ENC-DUP"))
        .await;

    for _ in 0..5 {
        app.deliver("present_proof_v2_0", WebhookFixtures::verified_event("ex-dup"))
            .await;
    }
    app.wait_for_fetches(5).await;

    let body: Value = app.server.get("/claims").await.json();
    assert_eq!(body["claims"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unverified_exchange_creates_nothing() {
    let app = TestApp::new();
    let record = ExchangeRecordBuilder::new("ex-bad")
        .with_attributes(&EncounterFixtures::inpatient_with_procedure("ENC-BAD"))
        .verified(json!("false"))
        .field("verified_msgs", json!(["revocation check failed"]))
        .build();
    app.engine.insert_record(record).await;

    app.deliver("present_proof", WebhookFixtures::verified_event("ex-bad"))
        .await;
    app.wait_for_fetches(1).await;

    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_presentation_received_triggers_verification_only() {
    let app = TestApp::new();

    app.deliver("present_proof", WebhookFixtures::proof_event("ex-2", "presentation_received"))
        .await;

    for _ in 0..100 {
        if app.engine.verify_calls() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(app.engine.verify_calls(), 1);
    assert_eq!(app.engine.fetch_calls(), 0);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_webhook_is_acknowledged_whatever_the_outcome() {
    let app = TestApp::new();
    app.engine.set_failing(true).await;

    app.deliver("present_proof", WebhookFixtures::verified_event("ex-down"))
        .await;
    app.deliver("connections", json!({ "connection_id": "c-1", "state": "active" }))
        .await;
    app.deliver("issue_credential_v2_0", json!({ "cred_ex_id": "cx-1", "state": "done" }))
        .await;
    app.deliver("ping", json!({})).await;

    let response = app
        .server
        .post("/webhooks/topic/present_proof")
        .text("this is not json")
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["ok"], true);
}

// ============ Claims Query Tests ============

#[tokio::test]
async fn test_list_claims_filters_by_insured() {
    let app = TestApp::new();
    app.verified_exchange("ex-a", &EncounterFixtures::inpatient_with_procedure("ENC-A"))
        .await;
    app.verified_exchange("ex-b", &EncounterFixtures::outpatient("ENC-B"))
        .await;

    app.deliver("present_proof", WebhookFixtures::verified_event("ex-a"))
        .await;
    app.deliver("present_proof", WebhookFixtures::verified_event("ex-b"))
        .await;
    app.wait_for_claims(2).await;

    let body: Value = app
        .server
        .get("/claims")
        .add_query_param("insuredId", "INS-200")
        .await
        .json();
    assert_eq!(body["ok"], true);
    let claims = body["claims"].as_array().unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0]["encounterDTO"]["encounterId"], "ENC-B");

    let body: Value = app
        .server
        .get("/claims")
        .add_query_param("insuredId", "INS-404")
        .await
        .json();
    assert!(body["claims"].as_array().unwrap().is_empty());

    let body: Value = app.server.get("/claims").await.json();
    assert_eq!(body["claims"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_claims_rejects_empty_insured() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/claims")
        .add_query_param("insuredId", "")
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["ok"], false);
}

#[tokio::test]
async fn test_get_unknown_claim() {
    let app = TestApp::new();

    let response = app.server.get("/claims/CLAIM-000042").await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("CLAIM-000042"));

    app.server
        .get("/claims/not-a-claim")
        .await
        .assert_status_not_found();
}

// ============ Preview Tests ============

#[tokio::test]
async fn test_preview_does_not_create_claim() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/claims/preview")
        .json(&json!({
            "encounterClass": "INPATIENT",
            "admissionDate": "2025-06-01",
            "dischargeDate": "2025-06-05",
            "procedureCode": "0DTJ4ZZ"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["eligible"], true);
    assert_eq!(body["totalPayout"], 800_000);
    assert_eq!(body["breakdown"].as_array().unwrap().len(), 2);
    assert!(body.get("encounterDTO").is_none());
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_preview_below_threshold() {
    let app = TestApp::new();

    let body: Value = app
        .server
        .post("/claims/preview")
        .json(&json!({ "encounter_class": "INPATIENT", "admission_date": "2025-06-01" }))
        .await
        .json();

    assert_eq!(body["eligible"], false);
    assert_eq!(body["totalPayout"], 0);
    assert!(body["breakdown"][0].as_str().unwrap().contains("minimum"));
}

#[tokio::test]
async fn test_preview_class_match_is_exact() {
    let app = TestApp::new();

    let body: Value = app
        .server
        .post("/claims/preview")
        .json(&json!({
            "encounter_class": "inpatient",
            "admission_date": "2025-06-01",
            "discharge_date": "2025-06-05"
        }))
        .await
        .json();

    assert_eq!(body["eligible"], false);
    assert_eq!(body["totalPayout"], 0);
}

#[tokio::test]
async fn test_preview_rejects_non_string_attributes() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/claims/preview")
        .json(&json!({ "encounter_class": "INPATIENT", "stay": 4 }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["ok"], false);

    app.server
        .post("/claims/preview")
        .json(&json!(["not", "an", "object"]))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
