//! In-memory adapter implementations for port contracts.
//!
//! These implementations are intended for:
//! - Unit/integration tests
//! - Deterministic contract tests for the ports layer
//! - Exact-order assertions on emitted metrics

use recstat_domain::SignedDuration;
use recstat_ports::{ClockPort, TelemetryPort, TelemetryTags};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime};

/// A no-op telemetry implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetryPort for NoopTelemetry {
    fn increment_counter(&self, _name: &str, _value: u64, _tags: Option<&TelemetryTags>) {}

    fn record_timing(&self, _name: &str, _elapsed: SignedDuration, _tags: Option<&TelemetryTags>) {
    }

    fn copy_handle(&self) -> Arc<dyn TelemetryPort> {
        Arc::new(Self)
    }
}

/// What a single emission carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionKind {
    /// Counter increment by the given amount.
    Counter(u64),
    /// Timing sample.
    Timing(SignedDuration),
}

/// One recorded emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    /// Id of the handle that emitted (0 for the original, then one per copy).
    pub handle: u64,
    /// Metric name.
    pub name: String,
    /// Counter or timing payload.
    pub kind: EmissionKind,
    /// Tags supplied with the emission (empty when none).
    pub tags: TelemetryTags,
}

#[derive(Debug, Default)]
struct RecordingLog {
    emissions: Mutex<Vec<Emission>>,
    next_handle: AtomicU64,
}

/// Telemetry that records every emission in order.
///
/// Copies share the log but carry their own handle id, so tests can tell
/// which handle emitted what.
#[derive(Debug, Clone)]
pub struct RecordingTelemetry {
    handle: u64,
    log: Arc<RecordingLog>,
}

impl Default for RecordingTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingTelemetry {
    /// Create an empty recorder (handle id 0).
    #[must_use]
    pub fn new() -> Self {
        let log = Arc::new(RecordingLog::default());
        log.next_handle.store(1, Ordering::SeqCst);
        Self { handle: 0, log }
    }

    /// Number of copies made from any handle sharing this log.
    #[must_use]
    pub fn copies_made(&self) -> u64 {
        self.log.next_handle.load(Ordering::SeqCst) - 1
    }

    /// All emissions, in emission order.
    #[must_use]
    pub fn emissions(&self) -> Vec<Emission> {
        self.log.emissions.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// `(name, kind)` pairs, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<(String, EmissionKind)> {
        self.emissions()
            .into_iter()
            .map(|emission| (emission.name, emission.kind))
            .collect()
    }

    /// Sum of every counter increment under `name`.
    #[must_use]
    pub fn counter_total(&self, name: &str) -> u64 {
        self.emissions()
            .iter()
            .filter(|emission| emission.name == name)
            .filter_map(|emission| match emission.kind {
                EmissionKind::Counter(value) => Some(value),
                EmissionKind::Timing(_) => None,
            })
            .sum()
    }

    /// Every timing sample recorded under `name`.
    #[must_use]
    pub fn timings(&self, name: &str) -> Vec<SignedDuration> {
        self.emissions()
            .iter()
            .filter(|emission| emission.name == name)
            .filter_map(|emission| match emission.kind {
                EmissionKind::Timing(elapsed) => Some(elapsed),
                EmissionKind::Counter(_) => None,
            })
            .collect()
    }

    fn push(&self, name: &str, kind: EmissionKind, tags: Option<&TelemetryTags>) {
        let emission = Emission {
            handle: self.handle,
            name: name.to_owned(),
            kind,
            tags: tags.cloned().unwrap_or_default(),
        };
        self.log
            .emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(emission);
    }
}

impl TelemetryPort for RecordingTelemetry {
    fn increment_counter(&self, name: &str, value: u64, tags: Option<&TelemetryTags>) {
        self.push(name, EmissionKind::Counter(value), tags);
    }

    fn record_timing(&self, name: &str, elapsed: SignedDuration, tags: Option<&TelemetryTags>) {
        self.push(name, EmissionKind::Timing(elapsed), tags);
    }

    fn copy_handle(&self) -> Arc<dyn TelemetryPort> {
        let handle = self.log.next_handle.fetch_add(1, Ordering::SeqCst);
        Arc::new(Self {
            handle,
            log: Arc::clone(&self.log),
        })
    }
}

#[derive(Debug)]
struct ManualClockState {
    wall: SystemTime,
    elapsed: Duration,
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a processor under test can advance the
/// clock that the decorator reads.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    state: Arc<Mutex<ManualClockState>>,
}

impl ManualClock {
    /// Start the clock at `wall`.
    #[must_use]
    pub fn new(wall: SystemTime) -> Self {
        Self {
            base: Instant::now(),
            state: Arc::new(Mutex::new(ManualClockState {
                wall,
                elapsed: Duration::ZERO,
            })),
        }
    }

    /// Start the clock at `epoch_ms` milliseconds after the Unix epoch.
    #[must_use]
    pub fn at_epoch_ms(epoch_ms: u64) -> Self {
        Self::new(SystemTime::UNIX_EPOCH + Duration::from_millis(epoch_ms))
    }

    /// Move both wall-clock and monotonic time forward.
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.wall += by;
        state.elapsed += by;
    }

    /// Jump the wall clock without touching monotonic time.
    pub fn set_wall(&self, wall: SystemTime) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).wall = wall;
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> SystemTime {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).wall
    }

    fn monotonic(&self) -> Instant {
        self.base + self.state.lock().unwrap_or_else(PoisonError::into_inner).elapsed
    }
}

/// Build a single-tag map for tests.
#[must_use]
pub fn tags_1(key: &str, value: &str) -> TelemetryTags {
    let mut tags = TelemetryTags::new();
    tags.insert(
        key.to_owned().into_boxed_str(),
        value.to_owned().into_boxed_str(),
    );
    tags
}
