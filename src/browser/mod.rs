//! Headless-browser management.
//!
//! The audit drivers talk to the browser through the [`BrowserLauncher`] /
//! [`BrowserHandle`] / [`Page`] traits so tests can substitute fakes; the
//! real implementation spawns a Chromium process with a remote-debugging
//! port and drives it over the Chrome DevTools Protocol (see [`cdp`]).
//!
//! An audit moves through launch → ready → auditing → result extraction →
//! cleanup; cleanup runs on every path once a launch succeeded, and the
//! handle's `Drop` kills the child as a last resort.

pub mod cdp;
mod chrome;
mod page;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error_handling::AuditError;

pub use chrome::{find_chrome_binary, ChromeHandle, ChromeLauncher};
pub use page::CdpPage;

/// Launches browser instances. One launch per audit.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Starts a browser and waits until its debug endpoint accepts
    /// connections.
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>, AuditError>;

    /// Checks that a browser binary exists without launching one. Used at
    /// startup so missing tooling surfaces as 503 instead of a failed run.
    fn available(&self) -> bool;
}

/// A running browser instance owned by one audit.
#[async_trait]
pub trait BrowserHandle: Send + Sync {
    /// DevTools debug port of this instance.
    fn debug_port(&self) -> u16;

    /// Opens a fresh page (tab) and attaches to it.
    async fn open_page(&mut self) -> Result<Box<dyn Page>, AuditError>;

    /// Tears the browser down. Idempotent; never fails the audit.
    async fn close(&mut self);
}

/// One attached page, ready for navigation and script evaluation.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigates and waits for the page to settle, within `budget`.
    async fn navigate(&self, url: &str, budget: Duration) -> Result<(), AuditError>;

    /// Evaluates a JS expression in the page, returning its JSON value.
    async fn evaluate(&self, expression: &str) -> Result<Value, AuditError>;

    /// Emulates a viewport of the given CSS-pixel size.
    async fn set_device_metrics(
        &self,
        width: u32,
        height: u32,
        mobile: bool,
    ) -> Result<(), AuditError>;

    /// Restores the default viewport.
    async fn clear_device_metrics(&self) -> Result<(), AuditError>;
}
