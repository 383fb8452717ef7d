//! Performance/accessibility audit driver.
//!
//! Launches a headless browser, points the external `lighthouse` CLI at its
//! debug port, and post-processes the engine's JSON into the common report
//! shape. The engine itself does all rendering and tracing; this module
//! only orchestrates and filters.

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use log::{debug, info, warn};
use regex::Regex;
use serde_json::Value;
use tokio::process::Command;

use crate::browser::BrowserLauncher;
use crate::config::{ENGINE_TIMEOUT, MAX_ISSUE_EXAMPLES};
use crate::error_handling::AuditError;
use crate::i18n::{Locale, Translations};
use crate::report::{AuditReport, CriterionReport, Issue};
use crate::urls::normalize_url;

/// Categories requested from the engine, in report order.
const ENGINE_CATEGORIES: &[&str] = &["performance", "accessibility", "best-practices", "seo"];

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    // [text](url) → text; markdown link syntax never nests in engine output
    Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("markdown link pattern is valid")
});

/// Runs the external auditing engine against a browser debug port.
///
/// Split out as a trait so tests can feed canned engine output through the
/// driver without a browser or the CLI installed.
#[async_trait]
pub trait EngineInvoker: Send + Sync {
    /// Invokes the engine and returns its parsed JSON result.
    async fn run(&self, url: &str, debug_port: u16) -> Result<Value, AuditError>;

    /// Whether the engine binary is present on this host.
    fn available(&self) -> bool;
}

/// The real `lighthouse` CLI.
pub struct LighthouseCli {
    binary: PathBuf,
}

impl LighthouseCli {
    pub fn new(binary: PathBuf) -> Self {
        LighthouseCli { binary }
    }

    fn resolve_binary(&self) -> Option<PathBuf> {
        if self.binary.components().count() > 1 {
            return self.binary.is_file().then(|| self.binary.clone());
        }
        let path_var = std::env::var_os("PATH")?;
        std::env::split_paths(&path_var)
            .map(|dir| dir.join(&self.binary))
            .find(|candidate| candidate.is_file())
    }
}

#[async_trait]
impl EngineInvoker for LighthouseCli {
    async fn run(&self, url: &str, debug_port: u16) -> Result<Value, AuditError> {
        let binary = self.resolve_binary().ok_or_else(|| {
            AuditError::EngineUnavailable(format!("{} not found on PATH", self.binary.display()))
        })?;

        debug!("Running {} against port {debug_port}", binary.display());
        let invocation = Command::new(&binary)
            .arg(url)
            .arg(format!("--port={debug_port}"))
            .arg("--output=json")
            .arg("--output-path=stdout")
            .arg(format!(
                "--only-categories={}",
                ENGINE_CATEGORIES.join(",")
            ))
            .arg("--quiet")
            .arg("--disable-full-page-screenshot")
            .output();

        let output = tokio::time::timeout(ENGINE_TIMEOUT, invocation)
            .await
            .map_err(|_| {
                AuditError::AuditFailure(format!("engine exceeded {ENGINE_TIMEOUT:?}"))
            })?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    AuditError::EngineUnavailable(format!("{}: {e}", binary.display()))
                }
                _ => AuditError::AuditFailure(format!("engine spawn failed: {e}")),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AuditError::AuditFailure(format!(
                "engine exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| AuditError::AuditFailure(format!("unparseable engine output: {e}")))
    }

    fn available(&self) -> bool {
        self.resolve_binary().is_some()
    }
}

/// Driver coupling a browser launch with one engine invocation.
pub struct LighthouseDriver {
    launcher: Arc<dyn BrowserLauncher>,
    engine: Arc<dyn EngineInvoker>,
}

impl LighthouseDriver {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, engine: Arc<dyn EngineInvoker>) -> Self {
        LighthouseDriver { launcher, engine }
    }

    /// Whether both the engine and a browser are present.
    pub fn available(&self) -> bool {
        self.engine.available() && self.launcher.available()
    }

    /// Runs one engine audit. The URL is normalized here, so a malformed
    /// value surfaces as a driver failure rather than request validation.
    pub async fn run(
        &self,
        raw_url: &str,
        locale: Locale,
        translations: &Translations,
    ) -> Result<AuditReport, AuditError> {
        let url = normalize_url(raw_url)?;
        if !self.engine.available() {
            return Err(AuditError::EngineUnavailable(
                "lighthouse CLI not found".to_string(),
            ));
        }

        let mut browser = self.launcher.launch().await?;
        info!("Engine audit of {url} on port {}", browser.debug_port());
        let engine_result = self.engine.run(&url, browser.debug_port()).await;
        // Cleanup runs no matter how the engine fared
        browser.close().await;

        build_report(&url, &engine_result?, locale, translations)
    }
}

/// Converts the engine's result document into an [`AuditReport`].
///
/// Keeps only audits that represent actionable findings: purely numeric
/// metric entries and audits at the maximal score are dropped, as are
/// not-applicable/manual/errored ones.
pub(crate) fn build_report(
    url: &str,
    engine_result: &Value,
    locale: Locale,
    translations: &Translations,
) -> Result<AuditReport, AuditError> {
    let audits = engine_result
        .get("audits")
        .and_then(Value::as_object)
        .ok_or_else(|| AuditError::AuditFailure("result carries no audits".to_string()))?;
    let categories = engine_result
        .get("categories")
        .and_then(Value::as_object)
        .ok_or_else(|| AuditError::AuditFailure("result carries no categories".to_string()))?;

    let mut criteria = Vec::new();
    for category_id in ENGINE_CATEGORIES {
        let Some(category) = categories.get(*category_id) else {
            warn!("Engine result is missing category {category_id}");
            continue;
        };

        let mut issues = Vec::new();
        for audit_ref in category["auditRefs"].as_array().unwrap_or(&Vec::new()) {
            let Some(audit_id) = audit_ref["id"].as_str() else {
                continue;
            };
            let Some(audit) = audits.get(audit_id) else {
                continue;
            };
            if let Some(issue) = issue_from_audit(audit_id, audit, locale, translations) {
                issues.push(issue);
            }
        }

        criteria.push(CriterionReport {
            criterion: translations.criterion(locale, category_id),
            issues,
            score: category["score"].as_f64().map(scale_score),
            details: None,
        });
    }

    if criteria.is_empty() {
        return Err(AuditError::AuditFailure(
            "result matched none of the requested categories".to_string(),
        ));
    }
    Ok(AuditReport::new(url, criteria))
}

/// Maps one engine audit to an issue, or `None` when it is not a finding.
fn issue_from_audit(
    audit_id: &str,
    audit: &Value,
    locale: Locale,
    translations: &Translations,
) -> Option<Issue> {
    let display_mode = audit["scoreDisplayMode"].as_str().unwrap_or("binary");
    if matches!(
        display_mode,
        "numeric" | "notApplicable" | "manual" | "error"
    ) {
        return None;
    }

    let score = audit["score"].as_f64();
    if let Some(score) = score {
        if score >= 1.0 {
            return None;
        }
    }

    // Prefer the locale table; otherwise fall back to the engine's own
    // default-locale text with markdown link syntax stripped
    let (title, description) =
        match translations.issue(locale, &format!("lighthouse.{audit_id}")) {
            Some(text) => (text.title, text.description),
            None => (
                audit["title"].as_str().unwrap_or(audit_id).to_string(),
                audit["description"]
                    .as_str()
                    .map(strip_markdown_links),
            ),
        };

    let details = &audit["details"];
    let (examples, total_examples) = match details["items"].as_array() {
        Some(items) if !items.is_empty() => (
            items.iter().take(MAX_ISSUE_EXAMPLES).cloned().collect(),
            Some(items.len()),
        ),
        _ => (Vec::new(), None),
    };

    Some(Issue {
        id: audit_id.to_string(),
        title,
        description,
        score: score.map(scale_score),
        savings_ms: details["overallSavingsMs"].as_f64(),
        savings_bytes: details["overallSavingsBytes"].as_u64(),
        examples,
        total_examples,
    })
}

fn scale_score(engine_score: f64) -> u8 {
    (engine_score.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Replaces `[text](url)` with `text`.
pub(crate) fn strip_markdown_links(text: &str) -> String {
    MARKDOWN_LINK.replace_all(text, "$1").into_owned()
}
