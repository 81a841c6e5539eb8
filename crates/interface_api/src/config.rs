//! API configuration

use serde::Deserialize;

use domain_claims::PayoutSchedule;
use infra_agent::{AgentConfig, ProofApiVersion};

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Base URL of the agent admin API
    pub agent_admin_url: String,
    /// `X-API-Key` for the agent admin API
    pub agent_api_key: Option<String>,
    /// Timeout for each agent call, in seconds
    pub agent_timeout_secs: u64,
    /// Proof API flavor exposed by the agent
    pub agent_proof_api: ProofApiVersion,
    /// Webhook events buffered before new deliveries are dropped
    pub webhook_queue_capacity: usize,
    /// Webhook events processed concurrently
    pub webhook_max_in_flight: usize,
    /// Policy assigned when the proof discloses none
    pub default_policy_id: String,
    /// Allowance per inpatient day, in minor units
    pub daily_rate: u64,
    /// Flat bonus when a procedure was performed, in minor units
    pub procedure_bonus: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let schedule = PayoutSchedule::default();
        let agent = AgentConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            agent_admin_url: agent.admin_url,
            agent_api_key: agent.api_key,
            agent_timeout_secs: agent.timeout_secs,
            agent_proof_api: agent.proof_api,
            webhook_queue_capacity: 1024,
            webhook_max_in_flight: 16,
            default_policy_id: "POLICY-DEFAULT".to_string(),
            daily_rate: schedule.daily_rate,
            procedure_bonus: schedule.procedure_bonus,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Payout constants; the minimum stay threshold is fixed
    pub fn payout_schedule(&self) -> PayoutSchedule {
        PayoutSchedule {
            daily_rate: self.daily_rate,
            procedure_bonus: self.procedure_bonus,
            ..PayoutSchedule::default()
        }
    }

    /// Settings for the agent admin API client
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            admin_url: self.agent_admin_url.clone(),
            api_key: self.agent_api_key.clone().filter(|key| !key.trim().is_empty()),
            timeout_secs: self.agent_timeout_secs,
            proof_api: self.agent_proof_api,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_payout_schedule() {
        let config = ApiConfig::default();
        let schedule = config.payout_schedule();

        assert_eq!(schedule.daily_rate, 100_000);
        assert_eq!(schedule.procedure_bonus, 300_000);
        assert_eq!(schedule.min_stay_days, 2);
        assert_eq!(config.agent_config().timeout_secs, 10);
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let config = ApiConfig {
            agent_api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.agent_config().api_key, None);
    }
}
