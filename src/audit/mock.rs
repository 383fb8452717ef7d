//! Mock audit driver.
//!
//! Fabricates a fixed-shape report without touching the network: each
//! category draws zero to two issues from its candidate pool. Useful as a
//! cheap smoke endpoint and for frontend development against realistic
//! report shapes.

use std::sync::Mutex;
use std::time::Duration;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Platform;
use crate::config::MOCK_AUDIT_DELAY;
use crate::error_handling::AuditError;
use crate::i18n::{Locale, Translations};
use crate::report::{AuditReport, CriterionReport, Issue};

/// One mock category and its candidate issue pool.
struct Category {
    id: &'static str,
    mobile_only: bool,
    pool: &'static [&'static str],
}

const CATEGORIES: &[Category] = &[
    Category {
        id: "layout",
        mobile_only: false,
        pool: &[
            "mock.layout.cluttered_sections",
            "mock.layout.inconsistent_spacing",
            "mock.layout.misaligned_grid",
            "mock.layout.excessive_density",
        ],
    },
    Category {
        id: "navigation",
        mobile_only: false,
        pool: &[
            "mock.navigation.too_many_items",
            "mock.navigation.unclear_labels",
            "mock.navigation.missing_breadcrumbs",
            "mock.navigation.hidden_search",
        ],
    },
    Category {
        id: "typography",
        mobile_only: false,
        pool: &[
            "mock.typography.small_base_font",
            "mock.typography.low_contrast_text",
            "mock.typography.too_many_typefaces",
            "mock.typography.tight_line_height",
        ],
    },
    Category {
        id: "accessibility",
        mobile_only: false,
        pool: &[
            "mock.accessibility.missing_alt_text",
            "mock.accessibility.unlabelled_controls",
            "mock.accessibility.low_contrast_elements",
            "mock.accessibility.missing_landmarks",
        ],
    },
    Category {
        id: "mobile",
        mobile_only: true,
        pool: &[
            "mock.mobile.small_tap_targets",
            "mock.mobile.horizontal_scroll",
            "mock.mobile.missing_viewport_meta",
            "mock.mobile.no_adaptive_menu",
        ],
    },
    Category {
        id: "visual_hierarchy",
        mobile_only: false,
        pool: &[
            "mock.visual_hierarchy.no_clear_focus",
            "mock.visual_hierarchy.competing_accents",
            "mock.visual_hierarchy.weak_heading_scale",
            "mock.visual_hierarchy.buried_call_to_action",
        ],
    },
];

/// Probability that a category reports no issues at all. Fixed behavior,
/// not a tunable.
const CLEAN_CATEGORY_PROBABILITY: f64 = 0.3;

/// Driver producing pseudo-random heuristic reports.
///
/// The PRNG is injected and seedable so tests can pin exact issue sets.
pub struct MockAuditDriver {
    rng: Mutex<StdRng>,
    delay: Duration,
}

impl MockAuditDriver {
    /// Creates a driver. `seed` pins the PRNG; `None` seeds from OS
    /// entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        MockAuditDriver {
            rng: Mutex::new(rng),
            delay: MOCK_AUDIT_DELAY,
        }
    }

    /// Runs one mock audit over the normalized URL.
    pub async fn run(
        &self,
        url: &str,
        platform: Platform,
        locale: Locale,
        translations: &Translations,
    ) -> Result<AuditReport, AuditError> {
        // Emulate the latency of a real audit
        tokio::time::sleep(self.delay).await;

        let picks = self.pick_issue_sets(platform);
        let criteria = picks
            .into_iter()
            .map(|(category_id, keys)| {
                let issues = keys
                    .into_iter()
                    .map(|key| localized_issue(key, locale, translations))
                    .collect();
                CriterionReport {
                    criterion: translations.criterion(locale, category_id),
                    issues,
                    score: None,
                    details: None,
                }
            })
            .collect();

        debug!("Mock audit of {url} for {platform:?} done");
        Ok(AuditReport::new(url, criteria))
    }

    /// Draws the issue keys per applicable category: 30% chance of a clean
    /// category, otherwise one or two distinct issues from its pool.
    fn pick_issue_sets(&self, platform: Platform) -> Vec<(&'static str, Vec<&'static str>)> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        CATEGORIES
            .iter()
            .filter(|category| !category.mobile_only || platform == Platform::Mobile)
            .map(|category| {
                let keys = if rng.random_bool(CLEAN_CATEGORY_PROBABILITY) {
                    Vec::new()
                } else {
                    let pool = category.pool;
                    let first = rng.random_range(0..pool.len());
                    let mut keys = vec![pool[first]];
                    if rng.random_bool(0.5) {
                        // Second pick skips the first by rotating past it
                        let offset = rng.random_range(1..pool.len());
                        keys.push(pool[(first + offset) % pool.len()]);
                    }
                    keys
                };
                (category.id, keys)
            })
            .collect()
    }
}

fn localized_issue(key: &str, locale: Locale, translations: &Translations) -> Issue {
    match translations.issue(locale, key) {
        Some(text) => Issue {
            description: text.description,
            ..Issue::new(key, text.title)
        },
        None => Issue::new(key, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{LocaleTable, Translations};

    fn empty_translations() -> Translations {
        Translations::from_tables(LocaleTable::default(), LocaleTable::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_seed_reproduces_issue_sets() {
        let t = empty_translations();
        let a = MockAuditDriver::new(Some(42))
            .run("https://example.com", Platform::Web, Locale::En, &t)
            .await
            .unwrap();
        let b = MockAuditDriver::new(Some(42))
            .run("https://example.com", Platform::Web, Locale::En, &t)
            .await
            .unwrap();
        let ids = |r: &crate::report::AuditReport| -> Vec<String> {
            r.criteria
                .iter()
                .flat_map(|c| c.issues.iter().map(|i| i.id.clone()))
                .collect()
        };
        assert_eq!(ids(&a), ids(&b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_web_platform_omits_mobile_category() {
        let t = empty_translations();
        let report = MockAuditDriver::new(Some(1))
            .run("https://example.com", Platform::Web, Locale::En, &t)
            .await
            .unwrap();
        assert_eq!(report.summary.criteria_total, 5);
        assert!(!report.criteria.iter().any(|c| c.criterion == "mobile"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mobile_platform_has_six_categories() {
        let t = empty_translations();
        let report = MockAuditDriver::new(Some(1))
            .run("https://example.com", Platform::Mobile, Locale::En, &t)
            .await
            .unwrap();
        assert_eq!(report.summary.criteria_total, 6);
        assert!(report.criteria.iter().any(|c| c.criterion == "mobile"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_issue_counts_stay_in_bounds() {
        let t = empty_translations();
        for seed in 0..50 {
            let report = MockAuditDriver::new(Some(seed))
                .run("https://example.com", Platform::Mobile, Locale::En, &t)
                .await
                .unwrap();
            for criterion in &report.criteria {
                assert!(criterion.issues.len() <= 2);
                // Distinct issues only
                if criterion.issues.len() == 2 {
                    assert_ne!(criterion.issues[0].id, criterion.issues[1].id);
                }
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_summary_consistency() {
        let t = empty_translations();
        let report = MockAuditDriver::new(Some(7))
            .run("https://example.com", Platform::Web, Locale::Ru, &t)
            .await
            .unwrap();
        let total: usize = report.criteria.iter().map(|c| c.issues.len()).sum();
        assert_eq!(report.summary.total_issues, total);
        assert_eq!(report.summary.passed, total == 0);
    }
}
