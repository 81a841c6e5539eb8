//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::ClaimNumber;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    let CoreError::Validation(msg) = error;
    assert_eq!(msg, "Invalid input");
}

#[test]
fn test_core_error_display() {
    let error = CoreError::validation("Test error");
    let display = format!("{}", error);

    assert!(display.contains("Validation error"));
}

#[test]
fn test_claim_number_parse_error_is_validation() {
    let error = "not-a-claim".parse::<ClaimNumber>().unwrap_err();
    assert!(matches!(error, CoreError::Validation(_)));
}
