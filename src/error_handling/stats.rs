//! Thread-safe audit statistics tracker.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use strum::IntoEnumIterator;
use strum_macros::EnumIter as EnumIterMacro;

use super::AuditError;

/// Counters tracked per service process.
///
/// Each variant maps to one counter exposed through `/status` and
/// `/metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum AuditCounter {
    MockAuditsStarted,
    MockAuditsCompleted,
    MockAuditsFailed,
    LighthouseAuditsStarted,
    LighthouseAuditsCompleted,
    LighthouseAuditsFailed,
    UxAuditsStarted,
    UxAuditsCompleted,
    UxAuditsFailed,
    InvalidInputRejections,
    LaunchFailures,
    NavigationTimeouts,
    EngineFailures,
}

impl AuditCounter {
    /// Metric name used in the Prometheus exposition format.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditCounter::MockAuditsStarted => "mock_audits_started",
            AuditCounter::MockAuditsCompleted => "mock_audits_completed",
            AuditCounter::MockAuditsFailed => "mock_audits_failed",
            AuditCounter::LighthouseAuditsStarted => "lighthouse_audits_started",
            AuditCounter::LighthouseAuditsCompleted => "lighthouse_audits_completed",
            AuditCounter::LighthouseAuditsFailed => "lighthouse_audits_failed",
            AuditCounter::UxAuditsStarted => "ux_audits_started",
            AuditCounter::UxAuditsCompleted => "ux_audits_completed",
            AuditCounter::UxAuditsFailed => "ux_audits_failed",
            AuditCounter::InvalidInputRejections => "invalid_input_rejections",
            AuditCounter::LaunchFailures => "launch_failures",
            AuditCounter::NavigationTimeouts => "navigation_timeouts",
            AuditCounter::EngineFailures => "engine_failures",
        }
    }
}

/// Thread-safe audit statistics tracker.
///
/// Tracks the count of each counter using atomics, allowing concurrent
/// access from request handlers. All counters are initialized to zero on
/// creation and the struct is shared across tasks behind an `Arc`.
pub struct AuditStats {
    counters: HashMap<AuditCounter, AtomicUsize>,
    start_time: Instant,
}

impl AuditStats {
    pub fn new() -> Self {
        let mut counters = HashMap::new();
        for counter in AuditCounter::iter() {
            counters.insert(counter, AtomicUsize::new(0));
        }
        AuditStats {
            counters,
            start_time: Instant::now(),
        }
    }

    pub fn increment(&self, counter: AuditCounter) {
        // All AuditCounter variants are initialized in new(), so unwrap() is safe
        self.counters
            .get(&counter)
            .unwrap()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self, counter: AuditCounter) -> usize {
        // All AuditCounter variants are initialized in new(), so unwrap() is safe
        self.counters.get(&counter).unwrap().load(Ordering::SeqCst)
    }

    /// Seconds since the stats tracker (and thus the service) started.
    pub fn uptime_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Total failed audits across all drivers.
    pub fn total_failures(&self) -> usize {
        self.get_count(AuditCounter::MockAuditsFailed)
            + self.get_count(AuditCounter::LighthouseAuditsFailed)
            + self.get_count(AuditCounter::UxAuditsFailed)
    }

    /// Records the failure-shape counter for an audit error, on top of the
    /// per-driver failed counter the handler increments.
    pub fn record_error(&self, error: &AuditError) {
        match error {
            AuditError::MissingUrl
            | AuditError::InvalidUrl(_)
            | AuditError::InvalidPlatform(_) => {
                self.increment(AuditCounter::InvalidInputRejections)
            }
            AuditError::LaunchFailure(_) | AuditError::BrowserUnavailable => {
                self.increment(AuditCounter::LaunchFailures)
            }
            AuditError::NavigationTimeout(_) => self.increment(AuditCounter::NavigationTimeouts),
            AuditError::EngineUnavailable(_) | AuditError::AuditFailure(_) => {
                self.increment(AuditCounter::EngineFailures)
            }
            AuditError::Cdp(_) => {}
        }
    }
}

impl Default for AuditStats {
    fn default() -> Self {
        Self::new()
    }
}
