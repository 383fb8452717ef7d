//! Service counters: JSON status and Prometheus metrics.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use strum::IntoEnumIterator;

use super::super::AppState;
use crate::error_handling::AuditCounter;

/// JSON response for the `/status` endpoint.
#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_seconds: f64,
    pub audits: DriverCounts,
    pub failures: FailureCounts,
}

#[derive(Serialize)]
pub struct DriverCounts {
    pub mock_started: usize,
    pub mock_completed: usize,
    pub lighthouse_started: usize,
    pub lighthouse_completed: usize,
    pub ux_started: usize,
    pub ux_completed: usize,
}

#[derive(Serialize)]
pub struct FailureCounts {
    pub total: usize,
    pub invalid_input: usize,
    pub launch_failures: usize,
    pub navigation_timeouts: usize,
    pub engine_failures: usize,
}

/// `GET /status` - JSON service counters.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let stats = &state.stats;
    Json(StatusResponse {
        uptime_seconds: stats.uptime_seconds(),
        audits: DriverCounts {
            mock_started: stats.get_count(AuditCounter::MockAuditsStarted),
            mock_completed: stats.get_count(AuditCounter::MockAuditsCompleted),
            lighthouse_started: stats.get_count(AuditCounter::LighthouseAuditsStarted),
            lighthouse_completed: stats.get_count(AuditCounter::LighthouseAuditsCompleted),
            ux_started: stats.get_count(AuditCounter::UxAuditsStarted),
            ux_completed: stats.get_count(AuditCounter::UxAuditsCompleted),
        },
        failures: FailureCounts {
            total: stats.total_failures(),
            invalid_input: stats.get_count(AuditCounter::InvalidInputRejections),
            launch_failures: stats.get_count(AuditCounter::LaunchFailures),
            navigation_timeouts: stats.get_count(AuditCounter::NavigationTimeouts),
            engine_failures: stats.get_count(AuditCounter::EngineFailures),
        },
    })
}

/// `GET /metrics` - Prometheus-compatible counters.
pub async fn metrics_handler(State(state): State<AppState>) -> String {
    let mut out = String::new();
    for counter in AuditCounter::iter() {
        let name = counter.as_str();
        out.push_str(&format!(
            "# HELP site_pulse_{name} Total {} events\n# TYPE site_pulse_{name} counter\nsite_pulse_{name} {}\n\n",
            name.replace('_', " "),
            state.stats.get_count(counter),
        ));
    }
    out.push_str(&format!(
        "# HELP site_pulse_uptime_seconds Service uptime\n# TYPE site_pulse_uptime_seconds gauge\nsite_pulse_uptime_seconds {}\n",
        state.stats.uptime_seconds(),
    ));
    out
}
