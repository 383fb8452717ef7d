//! Audit endpoint handlers.
//!
//! `/api/audit` validates and normalizes the URL up front, so malformed
//! input answers 400. The lighthouse and ux endpoints only require the
//! parameter to be present; normalization happens inside the driver and a
//! malformed URL therefore surfaces as a 500 driver failure.

use axum::extract::{Query, State};
use axum::Json;
use log::warn;

use super::super::types::{ApiError, AuditQuery};
use super::super::AppState;
use crate::audit::Platform;
use crate::error_handling::AuditCounter;
use crate::i18n::Locale;
use crate::report::AuditReport;
use crate::urls::normalize_url;

fn require_url(
    query: &AuditQuery,
    locale: Locale,
    state: &AppState,
) -> Result<String, ApiError> {
    match query.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url.to_string()),
        _ => {
            state.stats.increment(AuditCounter::InvalidInputRejections);
            Err(ApiError::invalid_input(
                "missing_url",
                locale,
                &state.translations,
            ))
        }
    }
}

/// `GET /api/audit` - mock heuristic audit.
pub async fn mock_audit(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditReport>, ApiError> {
    let locale = Locale::from_param(query.lang.as_deref());
    let raw_url = require_url(&query, locale, &state)?;

    let platform = Platform::from_param(query.platform.as_deref()).map_err(|e| {
        warn!("Rejected platform parameter: {e}");
        state.stats.increment(AuditCounter::InvalidInputRejections);
        ApiError::invalid_input("invalid_platform", locale, &state.translations)
    })?;

    let url = normalize_url(&raw_url).map_err(|e| {
        warn!("Rejected url parameter: {e}");
        state.stats.increment(AuditCounter::InvalidInputRejections);
        ApiError::invalid_input("invalid_url", locale, &state.translations)
    })?;

    state.stats.increment(AuditCounter::MockAuditsStarted);
    match state
        .mock
        .run(&url, platform, locale, &state.translations)
        .await
    {
        Ok(report) => {
            state.stats.increment(AuditCounter::MockAuditsCompleted);
            Ok(Json(report))
        }
        Err(error) => {
            warn!("Mock audit of {url} failed: {error}");
            state.stats.increment(AuditCounter::MockAuditsFailed);
            state.stats.record_error(&error);
            Err(ApiError::from_driver_error(&error, state.expose_errors))
        }
    }
}

/// `GET /api/lighthouse` - external-engine audit.
pub async fn lighthouse_audit(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditReport>, ApiError> {
    let locale = Locale::from_param(query.lang.as_deref());
    let raw_url = require_url(&query, locale, &state)?;

    state.stats.increment(AuditCounter::LighthouseAuditsStarted);
    match state
        .lighthouse
        .run(&raw_url, locale, &state.translations)
        .await
    {
        Ok(report) => {
            state
                .stats
                .increment(AuditCounter::LighthouseAuditsCompleted);
            Ok(Json(report))
        }
        Err(error) => {
            warn!("Engine audit of {raw_url} failed: {error}");
            state.stats.increment(AuditCounter::LighthouseAuditsFailed);
            state.stats.record_error(&error);
            Err(ApiError::from_driver_error(&error, state.expose_errors))
        }
    }
}

/// `GET /api/ux-audit` - browser heuristic audit.
pub async fn ux_audit(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditReport>, ApiError> {
    let locale = Locale::from_param(query.lang.as_deref());
    let raw_url = require_url(&query, locale, &state)?;

    state.stats.increment(AuditCounter::UxAuditsStarted);
    match state.ux.run(&raw_url, locale, &state.translations).await {
        Ok(report) => {
            state.stats.increment(AuditCounter::UxAuditsCompleted);
            Ok(Json(report))
        }
        Err(error) => {
            warn!("UX audit of {raw_url} failed: {error}");
            state.stats.increment(AuditCounter::UxAuditsFailed);
            state.stats.record_error(&error);
            Err(ApiError::from_driver_error(&error, state.expose_errors))
        }
    }
}
