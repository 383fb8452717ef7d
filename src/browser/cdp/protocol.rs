//! DevTools protocol message types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing JSON-RPC command.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Incoming message: either a command response (`id` set) or an event
/// (`method` set).
#[derive(Debug, Deserialize)]
pub struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorBody>,
    pub method: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Error body inside a command response.
#[derive(Debug, Deserialize)]
pub struct CdpErrorBody {
    pub code: i64,
    pub message: String,
}

/// Answer of the `/json/version` discovery endpoint.
///
/// Chrome returns PascalCase names here.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_omits_absent_fields() {
        let req = CdpRequest {
            id: 7,
            method: "Page.enable".to_string(),
            params: None,
            session_id: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"id": 7, "method": "Page.enable"}));
    }

    #[test]
    fn test_request_uses_wire_name_for_session_id() {
        let req = CdpRequest {
            id: 1,
            method: "Runtime.evaluate".to_string(),
            params: Some(json!({"expression": "1+1"})),
            session_id: Some("SESSION".to_string()),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["sessionId"], "SESSION");
    }

    #[test]
    fn test_response_parses_command_result() {
        let resp: CdpResponse =
            serde_json::from_str(r#"{"id": 3, "result": {"frameId": "F"}}"#).unwrap();
        assert_eq!(resp.id, Some(3));
        assert!(resp.error.is_none());
        assert!(resp.method.is_none());
    }

    #[test]
    fn test_response_parses_event() {
        let resp: CdpResponse =
            serde_json::from_str(r#"{"method": "Page.loadEventFired", "params": {}}"#).unwrap();
        assert_eq!(resp.id, None);
        assert_eq!(resp.method.as_deref(), Some("Page.loadEventFired"));
    }

    #[test]
    fn test_response_parses_error_body() {
        let resp: CdpResponse = serde_json::from_str(
            r#"{"id": 5, "error": {"code": -32000, "message": "Target closed"}}"#,
        )
        .unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "Target closed");
    }

    #[test]
    fn test_browser_version_parses_chrome_shape() {
        let version: BrowserVersion = serde_json::from_str(
            r#"{
                "Browser": "HeadlessChrome/120.0.0.0",
                "Protocol-Version": "1.3",
                "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/abc"
            }"#,
        )
        .unwrap();
        assert!(version.browser.starts_with("HeadlessChrome"));
        assert!(version.web_socket_debugger_url.starts_with("ws://"));
    }
}
