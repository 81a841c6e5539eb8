//! Protocol Engine Adapter
//!
//! Implements [`domain_claims::ProtocolEnginePort`] against the admin API of
//! a credential agent. The agent owns connections, proofs and wallets; this
//! crate only triggers verification and reads proof-exchange records.
//!
//! # Configuration
//!
//! ```rust,ignore
//! use infra_agent::{AgentClient, AgentConfig, ProofApiVersion};
//!
//! let client = AgentClient::new(AgentConfig {
//!     admin_url: "http://localhost:8021".to_string(),
//!     api_key: Some("admin-key".to_string()),
//!     timeout_secs: 10,
//!     proof_api: ProofApiVersion::V1,
//! })?;
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::AgentClient;
pub use config::{AgentConfig, ProofApiVersion};
pub use error::AgentError;
