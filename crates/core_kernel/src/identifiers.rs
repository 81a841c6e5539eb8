//! Strongly-typed identifiers for domain entities
//!
//! Identifiers coming from the protocol engine or from disclosed credential
//! attributes are opaque strings. Wrapping them in newtypes keeps an exchange
//! id from being passed where an encounter id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like value
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Creates an identifier only when the value is non-blank
            pub fn non_blank(value: &str) -> Option<Self> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }

            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Protocol engine identifiers
define_id!(ExchangeId);
define_id!(ConnectionId);

// Claims domain identifiers
define_id!(InsuredId);
define_id!(PolicyId);
define_id!(EncounterId);

/// Display prefix of every claim number
const CLAIM_PREFIX: &str = "CLAIM";

/// Width of the zero-padded sequence suffix
const CLAIM_SEQUENCE_WIDTH: usize = 6;

/// Sequence-based claim identifier, rendered as `CLAIM-000001`
///
/// The sequence is a display and correlation id, not a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClaimNumber(u64);

impl ClaimNumber {
    /// Creates a claim number from its sequence value
    pub fn from_sequence(sequence: u64) -> Self {
        Self(sequence)
    }

    /// Returns the sequence value
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClaimNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:0width$}", CLAIM_PREFIX, self.0, width = CLAIM_SEQUENCE_WIDTH)
    }
}

impl FromStr for ClaimNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix(CLAIM_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(|| CoreError::validation(format!("claim id must start with {CLAIM_PREFIX}-: {s}")))?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::validation(format!("claim id has a non-numeric suffix: {s}")));
        }

        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|e| CoreError::validation(format!("claim id out of range: {e}")))
    }
}

impl Serialize for ClaimNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClaimNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_number_display() {
        assert_eq!(ClaimNumber::from_sequence(1).to_string(), "CLAIM-000001");
        assert_eq!(ClaimNumber::from_sequence(1234567).to_string(), "CLAIM-1234567");
    }

    #[test]
    fn test_claim_number_parsing() {
        let parsed: ClaimNumber = "CLAIM-000042".parse().unwrap();
        assert_eq!(parsed.sequence(), 42);
        assert!("CLM-000042".parse::<ClaimNumber>().is_err());
        assert!("CLAIM-".parse::<ClaimNumber>().is_err());
        assert!("CLAIM-12a".parse::<ClaimNumber>().is_err());
    }

    #[test]
    fn test_non_blank_id() {
        assert!(EncounterId::non_blank("   ").is_none());
        assert_eq!(EncounterId::non_blank(" ENC-1 ").unwrap().as_str(), "ENC-1");
    }
}
