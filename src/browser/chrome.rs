//! Chromium process discovery, launch, and teardown.

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::process::{Child, Command};

use super::cdp::CdpClient;
use super::page::CdpPage;
use super::{BrowserHandle, BrowserLauncher, Page};
use crate::config::{BROWSER_READY_MAX_ATTEMPTS, BROWSER_READY_POLL_INTERVAL};
use crate::error_handling::AuditError;

/// Conventional Chromium install locations, probed in order.
const CHROME_CANDIDATES: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// Locates a Chromium binary: the explicit override first, then
/// conventional install paths.
pub fn find_chrome_binary(override_path: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        if path.exists() {
            return Some(path.clone());
        }
        warn!("Configured chrome path {} does not exist", path.display());
        return None;
    }
    CHROME_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Spawns headless Chromium instances, one per audit, each with its own
/// ephemeral debug port and profile directory.
pub struct ChromeLauncher {
    binary_override: Option<PathBuf>,
}

impl ChromeLauncher {
    pub fn new(binary_override: Option<PathBuf>) -> Self {
        ChromeLauncher { binary_override }
    }

    /// Picks a free TCP port for the debug endpoint.
    ///
    /// The port is released before Chrome binds it, so a concurrent process
    /// could steal it; the readiness poll below catches that as a failed
    /// launch rather than a hang.
    fn pick_debug_port() -> Result<u16, AuditError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .map_err(|e| AuditError::LaunchFailure(format!("no free port: {e}")))?;
        let port = listener
            .local_addr()
            .map_err(|e| AuditError::LaunchFailure(format!("no free port: {e}")))?
            .port();
        Ok(port)
    }

    async fn wait_until_ready(port: u16) -> Result<(), AuditError> {
        let version_url = format!("http://127.0.0.1:{port}/json/version");
        for _ in 0..BROWSER_READY_MAX_ATTEMPTS {
            tokio::time::sleep(BROWSER_READY_POLL_INTERVAL).await;
            if reqwest::get(&version_url).await.is_ok() {
                return Ok(());
            }
        }
        Err(AuditError::LaunchFailure(format!(
            "debug endpoint on port {port} did not come up"
        )))
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>, AuditError> {
        let binary = find_chrome_binary(self.binary_override.as_ref())
            .ok_or(AuditError::BrowserUnavailable)?;
        let port = Self::pick_debug_port()?;
        let profile_dir = tempfile::tempdir()
            .map_err(|e| AuditError::LaunchFailure(format!("profile dir: {e}")))?;

        debug!(
            "Launching {} with debug port {port}, profile {}",
            binary.display(),
            profile_dir.path().display()
        );

        let child = Command::new(&binary)
            .arg("--headless=new")
            .arg(format!("--remote-debugging-port={port}"))
            .arg(format!("--user-data-dir={}", profile_dir.path().display()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--disable-gpu")
            .arg("--mute-audio")
            .arg("--metrics-recording-only")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AuditError::LaunchFailure(e.to_string()))?;

        let mut handle = ChromeHandle {
            child,
            port,
            client: None,
            _profile_dir: profile_dir,
        };

        if let Err(e) = Self::wait_until_ready(port).await {
            // Launch counts as failed, but the process exists: tear it down
            // before surfacing the error.
            handle.close().await;
            return Err(e);
        }

        info!("Chromium ready on debug port {port}");
        Ok(Box::new(handle))
    }

    fn available(&self) -> bool {
        find_chrome_binary(self.binary_override.as_ref()).is_some()
    }
}

/// A live Chromium child process plus its DevTools connection.
pub struct ChromeHandle {
    child: Child,
    port: u16,
    client: Option<CdpClient>,
    _profile_dir: tempfile::TempDir,
}

#[async_trait]
impl BrowserHandle for ChromeHandle {
    fn debug_port(&self) -> u16 {
        self.port
    }

    async fn open_page(&mut self) -> Result<Box<dyn Page>, AuditError> {
        if self.client.is_none() {
            let endpoint = format!("http://127.0.0.1:{}", self.port);
            self.client = Some(CdpClient::connect(&endpoint).await?);
        }
        let Some(client) = self.client.as_ref() else {
            return Err(AuditError::LaunchFailure(
                "devtools connection unavailable".to_string(),
            ));
        };
        let session = client.new_page().await?;
        Ok(Box::new(CdpPage::new(session)))
    }

    async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            // Ask politely first so Chrome flushes its profile
            if let Err(e) = client.call("Browser.close", None).await {
                debug!("Browser.close failed, killing process: {e}");
            }
        }
        if let Err(e) = self.child.kill().await {
            debug!("Chromium process already gone: {e}");
        }
        debug!("Chromium on port {} shut down", self.port);
    }
}

impl Drop for ChromeHandle {
    fn drop(&mut self) {
        // Last resort if close() was never awaited
        let _ = self.child.start_kill();
    }
}
