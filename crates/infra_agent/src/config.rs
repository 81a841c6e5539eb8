//! Agent adapter configuration

use serde::Deserialize;

/// Which proof-presentation API the agent exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofApiVersion {
    /// `/present-proof/records/{id}`
    #[default]
    V1,
    /// `/present-proof-2.0/records/{id}`
    V2,
}

impl ProofApiVersion {
    /// Path prefix of the proof-record endpoints
    pub fn records_path(&self) -> &'static str {
        match self {
            ProofApiVersion::V1 => "/present-proof/records",
            ProofApiVersion::V2 => "/present-proof-2.0/records",
        }
    }
}

/// Connection settings for the agent admin API
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the admin API (e.g., "http://localhost:8021")
    pub admin_url: String,
    /// Value for the `X-API-Key` header, when the admin API is secured
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Proof API flavor
    #[serde(default)]
    pub proof_api: ProofApiVersion,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            admin_url: "http://localhost:8021".to_string(),
            api_key: None,
            timeout_secs: 10,
            proof_api: ProofApiVersion::V1,
        }
    }
}
