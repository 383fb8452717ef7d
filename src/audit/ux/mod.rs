//! UX heuristic audit driver.
//!
//! Launches a headless browser, navigates to the target, and runs six
//! inspection routines concurrently against the loaded page. The routines
//! only read the DOM; the mobile routine additionally toggles viewport
//! emulation for its second measurement.

mod checks;

use std::sync::Arc;

use log::info;

use checks::CheckOutcome;

use crate::browser::{BrowserHandle, BrowserLauncher};
use crate::config::NAVIGATION_TIMEOUT;
use crate::error_handling::AuditError;
use crate::i18n::{Locale, Translations};
use crate::report::{AuditReport, CriterionReport, Issue};
use crate::urls::normalize_url;

/// Criterion identifiers in report order.
const CRITERIA: &[&str] = &[
    "visual_hierarchy",
    "navigation",
    "typography",
    "interactivity",
    "mobile",
    "accessibility",
];

/// Driver for browser-heuristic UX audits.
pub struct UxAuditDriver {
    launcher: Arc<dyn BrowserLauncher>,
}

impl UxAuditDriver {
    pub fn new(launcher: Arc<dyn BrowserLauncher>) -> Self {
        UxAuditDriver { launcher }
    }

    /// Whether a browser binary is present on this host.
    pub fn available(&self) -> bool {
        self.launcher.available()
    }

    /// Runs one UX audit. The URL is normalized here, so a malformed value
    /// surfaces as a driver failure rather than request validation.
    pub async fn run(
        &self,
        raw_url: &str,
        locale: Locale,
        translations: &Translations,
    ) -> Result<AuditReport, AuditError> {
        let url = normalize_url(raw_url)?;
        let mut browser = self.launcher.launch().await?;
        info!("UX audit of {url} on port {}", browser.debug_port());

        let result = Self::audit_page(browser.as_mut(), &url, locale, translations).await;
        // Cleanup runs no matter which stage failed
        browser.close().await;
        result
    }

    async fn audit_page(
        browser: &mut dyn BrowserHandle,
        url: &str,
        locale: Locale,
        translations: &Translations,
    ) -> Result<AuditReport, AuditError> {
        let page = browser.open_page().await?;
        page.navigate(url, NAVIGATION_TIMEOUT).await?;

        let page = page.as_ref();
        let (visual, nav, typo, inter, mobile, a11y) = tokio::join!(
            checks::visual_hierarchy(page),
            checks::navigation(page),
            checks::typography(page),
            checks::interactivity(page),
            checks::mobile_adaptation(page),
            checks::accessibility(page),
        );

        let outcomes = [visual?, nav?, typo?, inter?, mobile?, a11y?];
        let criteria = CRITERIA
            .iter()
            .zip(outcomes)
            .map(|(id, outcome)| build_criterion(id, outcome, locale, translations))
            .collect();

        Ok(AuditReport::new(url, criteria))
    }
}

fn build_criterion(
    criterion_id: &str,
    outcome: CheckOutcome,
    locale: Locale,
    translations: &Translations,
) -> CriterionReport {
    let issues = outcome
        .issues
        .into_iter()
        .map(|key| match translations.issue(locale, key) {
            Some(text) => Issue {
                description: text.description,
                ..Issue::new(key, text.title)
            },
            None => Issue::new(key, key),
        })
        .collect();

    CriterionReport {
        criterion: translations.criterion(locale, criterion_id),
        issues,
        score: Some(outcome.score),
        details: Some(outcome.details),
    }
}
