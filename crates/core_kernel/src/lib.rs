//! Core Kernel - Foundational types for the claims back-office
//!
//! This crate provides the building blocks shared by every other crate:
//! - Strongly-typed identifiers for exchanges, parties, policies and claims
//! - The kernel error type
//! - Port abstractions for adapters to external systems

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{
    ClaimNumber, ExchangeId, ConnectionId, InsuredId, PolicyId, EncounterId,
};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
