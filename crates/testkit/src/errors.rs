//! Test fixtures for shared error codes and envelopes.

use recstat_shared::{ErrorClass, ErrorCode, ErrorEnvelope};

/// Return a list of common error codes used in tests.
pub fn common_error_codes() -> Vec<ErrorCode> {
    vec![
        ErrorCode::invalid_input(),
        ErrorCode::scope_value_missing(),
        ErrorCode::not_found(),
        ErrorCode::timeout(),
        ErrorCode::io(),
        ErrorCode::internal(),
    ]
}

/// A record the business logic refuses to handle.
pub fn poison_record_error() -> ErrorEnvelope {
    ErrorEnvelope::expected(ErrorCode::new("consumer", "poison_record"), "record rejected")
        .with_metadata("reason", "unparseable payload")
}

/// A retriable timeout error fixture.
pub fn timeout_error() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(ErrorCode::timeout(), "timeout", ErrorClass::Retriable)
}
