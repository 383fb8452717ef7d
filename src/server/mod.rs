//! HTTP façade.
//!
//! Exposes the audit drivers as GET endpoints, serves the locale files and
//! optional static assets, and applies the blanket request timeout and
//! panic-catching layers.

mod handlers;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use log::info;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

use crate::audit::{LighthouseCli, LighthouseDriver, MockAuditDriver, UxAuditDriver};
use crate::browser::ChromeLauncher;
use crate::config::{Config, REQUEST_TIMEOUT};
use crate::error_handling::{AuditStats, InitializationError};
use crate::i18n::Translations;

pub use types::{ApiError, AuditQuery};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub translations: Arc<Translations>,
    pub stats: Arc<AuditStats>,
    pub mock: Arc<MockAuditDriver>,
    pub lighthouse: Arc<LighthouseDriver>,
    pub ux: Arc<UxAuditDriver>,
    /// Include error chains in failure responses.
    pub expose_errors: bool,
}

/// Builds the service router over the given state.
///
/// Split from [`run_server`] so tests can drive the router in-process with
/// fake drivers.
pub fn build_router(
    state: AppState,
    lang_dir: PathBuf,
    public_dir: Option<PathBuf>,
) -> Router {
    let mut router = Router::new()
        .route("/api/audit", get(handlers::mock_audit))
        .route("/api/lighthouse", get(handlers::lighthouse_audit))
        .route("/api/ux-audit", get(handlers::ux_audit))
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .nest_service("/lang", ServeDir::new(lang_dir));

    if let Some(dir) = public_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

/// Builds the production state from configuration.
fn build_state(config: &Config) -> Result<AppState, InitializationError> {
    let translations = Arc::new(Translations::load(&config.lang_dir)?);
    let launcher = Arc::new(ChromeLauncher::new(config.chrome_path.clone()));
    let engine = Arc::new(LighthouseCli::new(config.lighthouse_bin.clone()));

    Ok(AppState {
        translations,
        stats: Arc::new(AuditStats::new()),
        mock: Arc::new(MockAuditDriver::new(config.mock_seed)),
        lighthouse: Arc::new(LighthouseDriver::new(launcher.clone(), engine)),
        ux: Arc::new(UxAuditDriver::new(launcher)),
        expose_errors: config.expose_errors,
    })
}

/// Creates and runs the audit service until ctrl-c.
pub async fn run_server(config: Config) -> Result<(), anyhow::Error> {
    let state = build_state(&config)?;

    if !state.ux.available() {
        log::warn!("No Chromium binary found; browser-backed endpoints will answer 503");
    }
    if !state.lighthouse.available() {
        log::warn!("Lighthouse CLI not found; /api/lighthouse will answer 503");
    }

    let app = build_router(state, config.lang_dir.clone(), config.public_dir.clone());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .map_err(|e| InitializationError::BindError {
            port: config.port,
            source: e,
        })?;

    info!("Audit service listening on http://0.0.0.0:{}/", config.port);
    info!("  - Mock audit:   /api/audit?url=...");
    info!("  - Engine audit: /api/lighthouse?url=...");
    info!("  - UX audit:     /api/ux-audit?url=...");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install ctrl-c handler: {e}");
        return;
    }
    info!("Shutdown signal received");
}
