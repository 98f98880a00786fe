//! # recstat-shared
//!
//! Shared utilities, result types, and error handling for the recstat workspace.
//!
//! This crate provides foundational types that are used across all other crates:
//!
//! - Result and error envelope types
//! - The request scope threaded through every record invocation
//! - Secret redaction helpers for tags and metadata
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Explicit context** - Request-scoped values travel in a `Scope`, never in globals
//! 3. **Serde-compatible** - Error types support serialization

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod redaction;
pub mod result;
pub mod scope;

pub use errors::{
    ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata, UnexpectedError,
    normalize_unexpected_error,
};
pub use redaction::{REDACTED, is_secret_key};
pub use result::Result;
pub use scope::{CorrelationId, Scope};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
