//! Session scoped to a single page target.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::Mutex;

use super::client::{CdpClient, PendingMap, WsSink};
use super::CdpError;

/// A flattened DevTools session attached to one page.
///
/// Shares the WebSocket and pending-request map with the owning
/// [`CdpClient`]; every command carries this session's id.
pub struct PageSession {
    session_id: String,
    ws_tx: Arc<Mutex<WsSink>>,
    pending: PendingMap,
    request_id: Arc<AtomicU64>,
}

impl PageSession {
    pub(crate) fn new(
        session_id: String,
        ws_tx: Arc<Mutex<WsSink>>,
        pending: PendingMap,
        request_id: Arc<AtomicU64>,
    ) -> Self {
        Self {
            session_id,
            ws_tx,
            pending,
            request_id,
        }
    }

    /// Sends a session-scoped command and waits for its response.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        CdpClient::send_raw(
            &self.ws_tx,
            &self.pending,
            &self.request_id,
            method,
            params,
            Some(&self.session_id),
        )
        .await
    }

    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        Ok(())
    }

    /// Starts a navigation. Does not wait for the load to finish.
    pub async fn navigate(&self, url: &str) -> Result<(), CdpError> {
        let result = self.call("Page.navigate", Some(json!({"url": url}))).await?;
        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            if !error.is_empty() {
                return Err(CdpError::Protocol {
                    code: 0,
                    message: error.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Polls `document.readyState` until the document is complete.
    pub async fn wait_for_ready(&self) -> Result<(), CdpError> {
        loop {
            let state = self.evaluate("document.readyState").await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }

    /// Evaluates a JS expression, awaiting promises, and returns the value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("unknown error");
            let detail = exception["exception"]["description"]
                .as_str()
                .unwrap_or("");
            return Err(CdpError::JavaScript(format!("{text} {detail}").trim().to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Emulates the given viewport.
    pub async fn set_device_metrics(
        &self,
        width: u32,
        height: u32,
        mobile: bool,
    ) -> Result<(), CdpError> {
        self.call(
            "Emulation.setDeviceMetricsOverride",
            Some(json!({
                "width": width,
                "height": height,
                "deviceScaleFactor": if mobile { 2.0 } else { 1.0 },
                "mobile": mobile,
            })),
        )
        .await?;
        Ok(())
    }

    /// Restores the default viewport.
    pub async fn clear_device_metrics(&self) -> Result<(), CdpError> {
        self.call("Emulation.clearDeviceMetricsOverride", None).await?;
        Ok(())
    }
}
