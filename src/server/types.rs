//! Request/response types of the HTTP façade.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error_handling::AuditError;
use crate::i18n::{Locale, Translations};

/// Query parameters accepted by the audit endpoints.
///
/// Everything is optional at the type level; handlers decide what is
/// required and answer 400 with a localized message otherwise.
#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub url: Option<String>,
    pub platform: Option<String>,
    pub lang: Option<String>,
}

/// An error response: status code plus localized message, with an optional
/// debug detail in exposed-errors mode.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl ApiError {
    /// 400 with a message from the locale error table.
    pub fn invalid_input(key: &str, locale: Locale, translations: &Translations) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: translations.error_message(locale, key),
            detail: None,
        }
    }

    /// Maps a driver failure: missing external tooling becomes 503,
    /// everything else 500. Input errors raised inside a driver (a
    /// malformed URL on the lighthouse/ux endpoints) stay 500: they failed
    /// the driver, not request validation.
    pub fn from_driver_error(error: &AuditError, expose_errors: bool) -> Self {
        let status = if error.is_unavailable() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        ApiError {
            status,
            message: error.to_string(),
            detail: expose_errors.then(|| format!("{error:?}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.detail {
            Some(detail) => json!({"error": self.message, "detail": detail}),
            None => json!({"error": self.message}),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LocaleTable;

    fn translations() -> Translations {
        let en: LocaleTable = serde_json::from_str(
            r#"{"errors": {"missing_url": "URL parameter is required"}}"#,
        )
        .unwrap();
        Translations::from_tables(en, LocaleTable::default())
    }

    #[test]
    fn test_invalid_input_is_400_and_localized() {
        let err = ApiError::invalid_input("missing_url", Locale::En, &translations());
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "URL parameter is required");
    }

    #[test]
    fn test_unavailable_tooling_is_503() {
        let err = ApiError::from_driver_error(&AuditError::BrowserUnavailable, false);
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_driver_invalid_url_stays_500() {
        let err =
            ApiError::from_driver_error(&AuditError::InvalidUrl("not a url".to_string()), false);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("not a url"));
    }

    #[test]
    fn test_detail_only_in_exposed_mode() {
        let error = AuditError::AuditFailure("boom".to_string());
        assert!(ApiError::from_driver_error(&error, false).detail.is_none());
        assert!(ApiError::from_driver_error(&error, true).detail.is_some());
    }
}
