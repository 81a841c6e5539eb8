//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claims back-office test suite.
//!
//! # Modules
//!
//! - `fixtures`: Encounter attributes and exchange-record builders
//! - `engine`: A scripted stand-in for the protocol engine
//! - `assertions`: Assertion helpers for claims and payout previews

pub mod fixtures;
pub mod engine;
pub mod assertions;

pub use fixtures::*;
pub use engine::*;
pub use assertions::*;
