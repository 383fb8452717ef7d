//! site_pulse library: browser-driven website auditing over HTTP
//!
//! This library provides the building blocks of a small audit service:
//! three audit drivers (a mock scorer, a Lighthouse-engine runner, and a
//! CDP-driven UX heuristic checker), the headless-browser plumbing they
//! share, and an axum HTTP façade that exposes each driver as a GET
//! endpoint returning a structured JSON report.
//!
//! # Example
//!
//! ```no_run
//! use site_pulse::{Config, run_server};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     port: 3000,
//!     ..Default::default()
//! };
//!
//! run_server(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. The Lighthouse and UX drivers
//! additionally need a Chromium binary on the host (and the `lighthouse`
//! CLI for the performance driver); the mock driver has no external
//! dependencies.

#![warn(missing_docs)]

pub mod audit;
pub mod browser;
pub mod config;
pub mod error_handling;
pub mod i18n;
pub mod initialization;
pub mod report;
pub mod server;
pub mod urls;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::AuditError;
pub use report::{AuditReport, CriterionReport, Issue, Summary};
pub use server::run_server;
