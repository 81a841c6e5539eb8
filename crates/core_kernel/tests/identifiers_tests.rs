//! Unit tests for the Identifiers module
//!
//! Tests cover the opaque string identifiers and the sequence-based
//! claim number, including display, parsing, and serialization.

use core_kernel::{ClaimNumber, ConnectionId, EncounterId, ExchangeId, InsuredId, PolicyId};

mod opaque_id_tests {
    use super::*;

    #[test]
    fn test_display_is_verbatim() {
        let id = ExchangeId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn test_non_blank_trims() {
        let id = InsuredId::non_blank("  patient-7 ").unwrap();
        assert_eq!(id.as_str(), "patient-7");
    }

    #[test]
    fn test_non_blank_rejects_whitespace() {
        assert!(PolicyId::non_blank("").is_none());
        assert!(PolicyId::non_blank(" \t ").is_none());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = EncounterId::from("ENC-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ENC-1\"");

        let back: EncounterId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_equality_is_exact() {
        assert_ne!(InsuredId::from("abc"), InsuredId::from("ABC"));
    }
}

mod claim_number_tests {
    use super::*;

    #[test]
    fn test_zero_padded_display() {
        assert_eq!(ClaimNumber::from_sequence(1).to_string(), "CLAIM-000001");
        assert_eq!(ClaimNumber::from_sequence(999_999).to_string(), "CLAIM-999999");
    }

    #[test]
    fn test_wider_than_padding() {
        assert_eq!(ClaimNumber::from_sequence(1_000_000).to_string(), "CLAIM-1000000");
    }

    #[test]
    fn test_parse_display_output() {
        let number = ClaimNumber::from_sequence(17);
        let parsed: ClaimNumber = number.to_string().parse().unwrap();
        assert_eq!(parsed, number);
    }

    #[test]
    fn test_parse_rejects_foreign_prefix() {
        assert!("CLM-000001".parse::<ClaimNumber>().is_err());
        assert!("000001".parse::<ClaimNumber>().is_err());
    }

    #[test]
    fn test_ordering_follows_sequence() {
        assert!(ClaimNumber::from_sequence(2) > ClaimNumber::from_sequence(1));
    }

    #[test]
    fn test_serializes_as_display_string() {
        let json = serde_json::to_value(ClaimNumber::from_sequence(3)).unwrap();
        assert_eq!(json, serde_json::json!("CLAIM-000003"));

        let back: ClaimNumber = serde_json::from_value(json).unwrap();
        assert_eq!(back.sequence(), 3);
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        let result: Result<ClaimNumber, _> = serde_json::from_str("\"CLAIM-x\"");
        assert!(result.is_err());
    }
}
