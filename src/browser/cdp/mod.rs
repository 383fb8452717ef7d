//! Minimal Chrome DevTools Protocol client.
//!
//! Speaks JSON-RPC over a WebSocket to a Chromium debug endpoint. Only the
//! handful of domains the audit drivers need are wired up: target
//! management, navigation, runtime evaluation, and device emulation.

mod client;
mod protocol;
mod session;

use thiserror::Error;

pub use client::CdpClient;
pub use protocol::{BrowserVersion, CdpRequest, CdpResponse};
pub use session::PageSession;

/// DevTools protocol client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// No browser answered at the debug endpoint.
    #[error("browser not available at {0}")]
    BrowserNotAvailable(String),

    /// WebSocket connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// WebSocket transport error mid-session.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// The browser rejected a command.
    #[error("protocol error: {message} (code {code})")]
    Protocol {
        /// DevTools error code.
        code: i64,
        /// DevTools error message.
        message: String,
    },

    /// Message (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error while discovering the WebSocket endpoint.
    #[error("http error: {0}")]
    Http(String),

    /// In-page script threw.
    #[error("javascript error: {0}")]
    JavaScript(String),

    /// A command got no answer within the per-command budget.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The connection closed while a command was in flight.
    #[error("session closed")]
    SessionClosed,

    /// The browser answered with an unexpected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}
