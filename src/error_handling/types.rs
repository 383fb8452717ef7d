//! Error types shared across the service.

use std::time::Duration;

use log::SetLoggerError;
use thiserror::Error;

use crate::browser::cdp::CdpError;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Locale table could not be read or parsed.
    #[error("Translation table error for '{locale}': {message}")]
    TranslationError {
        /// Locale code of the offending table.
        locale: String,
        /// What went wrong while loading it.
        message: String,
    },

    /// The HTTP listener could not be bound.
    #[error("Failed to bind to port {port}: {source}")]
    BindError {
        /// Port the façade attempted to bind.
        port: u16,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure modes of one audit, across all three drivers.
///
/// The façade maps these onto HTTP status codes: input validation failures
/// become 400, unavailable external tooling becomes 503, and everything
/// else surfaces as a 500 driver failure.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The request carried no `url` parameter.
    #[error("missing url parameter")]
    MissingUrl,

    /// The URL did not parse after normalization.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// `platform` was neither `web` nor `mobile`.
    #[error("invalid platform: {0}")]
    InvalidPlatform(String),

    /// No Chromium binary could be found on this host.
    #[error("no Chromium binary found; set --chrome-path or CHROME_PATH")]
    BrowserUnavailable,

    /// The auditing engine (lighthouse CLI) is not installed.
    #[error("auditing engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The browser process failed to start or never opened its debug port.
    #[error("browser launch failed: {0}")]
    LaunchFailure(String),

    /// Navigation did not settle within the budget.
    #[error("navigation timed out after {0:?}")]
    NavigationTimeout(Duration),

    /// The engine ran but produced no usable result.
    #[error("audit failed: {0}")]
    AuditFailure(String),

    /// A DevTools protocol command failed.
    #[error("browser protocol error: {0}")]
    Cdp(#[from] CdpError),
}

impl AuditError {
    /// Whether this failure is a client-side input problem.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AuditError::MissingUrl | AuditError::InvalidUrl(_) | AuditError::InvalidPlatform(_)
        )
    }

    /// Whether the failure means the external tooling is absent, as opposed
    /// to a run that started and went wrong.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AuditError::BrowserUnavailable | AuditError::EngineUnavailable(_)
        )
    }
}
