//! Request-scoped context threaded through every record invocation.
//!
//! A `Scope` is an immutable chain of typed values plus a correlation id.
//! Deriving a child never mutates the parent, so concurrent invocations can
//! branch off one shared root without coordinating.

use crate::{ErrorCode, ErrorEnvelope, Result};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A correlation identifier used for logging/telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    /// Parse a correlation identifier from user input.
    ///
    /// The value is trimmed; empty values are rejected.
    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "correlationId must be non-empty",
            ));
        }
        Ok(Self(Arc::<str>::from(trimmed)))
    }

    /// Create a new invocation id, best-effort unique within this process.
    #[must_use]
    pub fn new_invocation_id() -> Self {
        next_scoped_id(&INVOCATION_ID_COUNTER, "inv_")
    }

    /// Create a new batch id, best-effort unique within this process.
    #[must_use]
    pub fn new_batch_id() -> Self {
        next_scoped_id(&BATCH_ID_COUNTER, "batch_")
    }

    /// Borrow the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

static INVOCATION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static BATCH_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_scoped_id(counter: &AtomicU64, prefix: &'static str) -> CorrelationId {
    let n = counter.fetch_add(1, Ordering::Relaxed);
    CorrelationId(Arc::<str>::from(format!("{prefix}{n}")))
}

struct ScopeEntry {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Self>>,
}

/// Immutable, inheritable carrier of request-scoped values.
#[derive(Clone)]
pub struct Scope {
    correlation_id: CorrelationId,
    head: Option<Arc<ScopeEntry>>,
}

impl Scope {
    /// Create an empty scope with the given correlation id.
    #[must_use]
    pub const fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            head: None,
        }
    }

    /// Convenience constructor: an empty scope with an auto-generated `inv_*` id.
    #[must_use]
    pub fn root() -> Self {
        Self::new(CorrelationId::new_invocation_id())
    }

    /// Return the correlation id.
    #[must_use]
    pub const fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Derive a child scope with `value` bound under its type.
    ///
    /// The child shadows any earlier binding of the same type; `self` is unchanged.
    #[must_use]
    pub fn with_value<T>(&self, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            correlation_id: self.correlation_id.clone(),
            head: Some(Arc::new(ScopeEntry {
                key: TypeId::of::<T>(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Derive a child scope carrying the same values under a new correlation id.
    #[must_use]
    pub fn with_correlation_id(&self, correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            head: self.head.clone(),
        }
    }

    /// Look up the nearest binding of `T`.
    #[must_use]
    pub fn get<T>(&self) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        let wanted = TypeId::of::<T>();
        let mut current = self.head.as_deref();
        while let Some(entry) = current {
            if entry.key == wanted {
                return entry.value.downcast_ref::<T>();
            }
            current = entry.parent.as_deref();
        }
        None
    }

    /// Look up the nearest binding of `T`, failing with `core:scope_value_missing`.
    pub fn require<T>(&self, what: &'static str) -> Result<&T>
    where
        T: Any + Send + Sync,
    {
        self.get::<T>().ok_or_else(|| {
            ErrorEnvelope::invariant(
                ErrorCode::scope_value_missing(),
                format!("scope has no bound {what}"),
            )
            .with_metadata("value", what)
            .with_metadata("correlationId", self.correlation_id.as_str())
        })
    }

    /// Returns true when a value of type `T` is bound.
    #[must_use]
    pub fn contains<T>(&self) -> bool
    where
        T: Any + Send + Sync,
    {
        self.get::<T>().is_some()
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.head.as_deref();
        while let Some(entry) = current {
            depth += 1;
            current = entry.parent.as_deref();
        }
        depth
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Scope")
            .field("correlation_id", &self.correlation_id)
            .field("values", &self.depth())
            .finish_non_exhaustive()
    }
}
