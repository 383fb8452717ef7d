//! URL validation and normalization.

use crate::error_handling::AuditError;

/// Maximum URL length (2048 characters) to prevent DoS via extremely long
/// URLs. Matches common browser and server limits.
const MAX_URL_LENGTH: usize = 2048;

/// Normalizes and validates a target URL.
///
/// Trims surrounding whitespace, then prepends `https://` when the value has
/// no `http://` or `https://` prefix (matched case-insensitively). The
/// normalized value must parse as an http(s) URL with a host.
///
/// # Arguments
///
/// * `raw` - The URL string as received from the client
///
/// # Returns
///
/// The normalized URL, or `AuditError::InvalidUrl` when the input cannot be
/// turned into a fetchable http(s) URL.
pub fn normalize_url(raw: &str) -> Result<String, AuditError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AuditError::InvalidUrl(raw.to_string()));
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(AuditError::InvalidUrl(format!(
            "{}... ({} bytes)",
            truncate_for_display(trimmed),
            trimmed.len()
        )));
    }

    let lowered = trimmed.to_ascii_lowercase();
    let normalized = if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
        format!("https://{trimmed}")
    } else {
        trimmed.to_string()
    };

    if normalized.len() > MAX_URL_LENGTH {
        return Err(AuditError::InvalidUrl(format!(
            "{}... ({} bytes)",
            truncate_for_display(&normalized),
            normalized.len()
        )));
    }

    match url::Url::parse(&normalized) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" if parsed.host_str().is_some() => Ok(normalized),
            _ => Err(AuditError::InvalidUrl(trimmed.to_string())),
        },
        Err(_) => Err(AuditError::InvalidUrl(trimmed.to_string())),
    }
}

/// First 50 characters, cut on a char boundary.
fn truncate_for_display(value: &str) -> String {
    value.chars().take(50).collect()
}
