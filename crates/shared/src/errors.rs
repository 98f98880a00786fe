//! Error envelope types and helpers.
//!
//! `ErrorEnvelope` is the single failure type that crosses crate boundaries.
//! Record processors return it as their opaque failure; the metrics layers
//! never build, wrap, or rewrite one on the processing path.

use crate::redaction::{REDACTED, is_secret_key};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, io};

/// Metadata attached to errors for diagnostics.
pub type ErrorMetadata = BTreeMap<String, String>;

/// High-level classification of error origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Expected failures (validation, user input, bad records).
    Expected,
    /// Invariant violations in domain logic.
    Invariant,
    /// Unexpected failures (I/O, external dependencies).
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => formatter.write_str("expected"),
            Self::Invariant => formatter.write_str("invariant"),
            Self::Unexpected => formatter.write_str("unexpected"),
        }
    }
}

/// Retry classification for failure handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// The operation can be retried safely.
    Retriable,
    /// The operation should not be retried.
    NonRetriable,
}

impl ErrorClass {
    /// Returns true when the error is considered retriable.
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Retriable)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retriable => formatter.write_str("retriable"),
            Self::NonRetriable => formatter.write_str("non-retriable"),
        }
    }
}

/// Stable error code with namespace and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Create a new error code with a namespace and code.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }

    /// Invalid input code.
    pub fn invalid_input() -> Self {
        Self::new("core", "invalid_input")
    }

    /// A value expected in the request scope was not bound.
    pub fn scope_value_missing() -> Self {
        Self::new("core", "scope_value_missing")
    }

    /// Not found code.
    pub fn not_found() -> Self {
        Self::new("core", "not_found")
    }

    /// Permission denied code.
    pub fn permission_denied() -> Self {
        Self::new("core", "permission_denied")
    }

    /// Timeout code.
    pub fn timeout() -> Self {
        Self::new("core", "timeout")
    }

    /// I/O error code.
    pub fn io() -> Self {
        Self::new("core", "io")
    }

    /// Internal failure code.
    pub fn internal() -> Self {
        Self::new("core", "internal")
    }

    /// Returns the namespace portion.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the code identifier.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

/// Structured error envelope shared across crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Error kind describing the origin category.
    pub kind: ErrorKind,
    /// Retry classification.
    pub class: ErrorClass,
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Additional diagnostic metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ErrorMetadata,
}

impl ErrorEnvelope {
    /// Create an expected error with non-retriable classification.
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::expected_with_class(code, message, ErrorClass::NonRetriable)
    }

    /// Create an expected error with an explicit retry classification.
    pub fn expected_with_class(
        code: ErrorCode,
        message: impl Into<String>,
        class: ErrorClass,
    ) -> Self {
        Self {
            kind: ErrorKind::Expected,
            class,
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Create an invariant error (always non-retriable).
    pub fn invariant(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Invariant,
            class: ErrorClass::NonRetriable,
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Create an unexpected error with the provided retry classification.
    pub fn unexpected(code: ErrorCode, message: impl Into<String>, class: ErrorClass) -> Self {
        Self {
            kind: ErrorKind::Unexpected,
            class,
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a single metadata entry. Secret-looking keys are stored redacted.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = if is_secret_key(&key) {
            REDACTED.to_string()
        } else {
            value.into()
        };
        self.metadata.insert(key, value);
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} {} {}: {}",
            self.kind, self.class, self.code, self.message
        )
    }
}

impl std::error::Error for ErrorEnvelope {}

impl From<io::Error> for ErrorEnvelope {
    fn from(error: io::Error) -> Self {
        normalize_unexpected_error(UnexpectedError::error(error))
    }
}

/// Normalize unexpected errors into a structured envelope.
pub fn normalize_unexpected_error(error: UnexpectedError) -> ErrorEnvelope {
    match error {
        UnexpectedError::Message(message) => {
            ErrorEnvelope::unexpected(ErrorCode::internal(), message, ErrorClass::NonRetriable)
        },
        UnexpectedError::Error(error) => {
            let (code, class) = classify_error(&*error);
            ErrorEnvelope::unexpected(code, error.to_string(), class)
        },
    }
}

/// Normalized wrapper for unexpected errors and messages.
#[derive(Debug)]
pub enum UnexpectedError {
    /// Unexpected error message.
    Message(String),
    /// Unexpected error payload.
    Error(Box<dyn std::error::Error + Send + Sync>),
}

impl UnexpectedError {
    /// Wrap an unexpected message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wrap an unexpected error value.
    pub fn error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Error(Box::new(error))
    }
}

fn classify_error(error: &(dyn std::error::Error + 'static)) -> (ErrorCode, ErrorClass) {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(candidate) = current {
        if let Some(io_error) = candidate.downcast_ref::<io::Error>() {
            return classify_io(io_error.kind());
        }
        current = candidate.source();
    }

    (ErrorCode::internal(), ErrorClass::NonRetriable)
}

fn classify_io(kind: io::ErrorKind) -> (ErrorCode, ErrorClass) {
    let code = match kind {
        io::ErrorKind::NotFound => ErrorCode::not_found(),
        io::ErrorKind::PermissionDenied => ErrorCode::permission_denied(),
        io::ErrorKind::TimedOut => ErrorCode::timeout(),
        _ => ErrorCode::io(),
    };
    let class = match kind {
        io::ErrorKind::WouldBlock
        | io::ErrorKind::TimedOut
        | io::ErrorKind::Interrupted
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::BrokenPipe => ErrorClass::Retriable,
        _ => ErrorClass::NonRetriable,
    };
    (code, class)
}
