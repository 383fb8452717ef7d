//! Audit report data model.
//!
//! Every driver produces the same report shape: a list of criteria, each
//! carrying its issues and an optional 0-100 score, plus a computed
//! summary. Reports are built once per request and never persisted.
//!
//! Wire format uses camelCase field names; clients of the original service
//! depend on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One detected problem within a criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Machine-readable identifier, e.g. `ux.typography.base_font_too_small`.
    pub id: String,
    /// Localized display title.
    pub title: String,
    /// Localized explanation, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Integer score in `[0,100]`, or `None` when not numerically scored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    /// Estimated time saving in milliseconds, when the engine reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_ms: Option<f64>,
    /// Estimated transfer saving in bytes, when the engine reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_bytes: Option<u64>,
    /// Sample of offending items, capped at
    /// [`crate::config::MAX_ISSUE_EXAMPLES`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
    /// Total offending item count when `examples` was truncated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_examples: Option<usize>,
}

impl Issue {
    /// A minimal issue with just an identifier and localized title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Issue {
            id: id.into(),
            title: title.into(),
            description: None,
            score: None,
            savings_ms: None,
            savings_bytes: None,
            examples: Vec::new(),
            total_examples: None,
        }
    }
}

/// One audited criterion and its findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionReport {
    /// Localized criterion display name.
    pub criterion: String,
    /// Issues found, worst-first.
    pub issues: Vec<Issue>,
    /// Criterion score in `[0,100]`, or `None` when unscored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    /// Raw measurements backing the verdict, when the driver exposes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl CriterionReport {
    /// Orders issues worst-first: ascending by score, unscored last.
    /// The sort is stable, so equally-scored issues keep detection order.
    pub fn sort_issues(&mut self) {
        self.issues
            .sort_by_key(|issue| issue.score.map(u16::from).unwrap_or(u16::MAX));
    }
}

/// Aggregate over all criteria of one report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Sum of issue counts across criteria.
    pub total_issues: usize,
    /// Number of criteria with at least one issue.
    pub criteria_with_issues: usize,
    /// Number of criteria evaluated.
    pub criteria_total: usize,
    /// True iff no issues were found anywhere.
    pub passed: bool,
    /// Unweighted mean of the scored criteria, rounded to two decimals.
    /// `None` when no criterion carries a score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
}

impl Summary {
    /// Computes the summary for a set of criteria.
    pub fn from_criteria(criteria: &[CriterionReport]) -> Self {
        let total_issues: usize = criteria.iter().map(|c| c.issues.len()).sum();
        let criteria_with_issues = criteria.iter().filter(|c| !c.issues.is_empty()).count();

        let scores: Vec<f64> = criteria
            .iter()
            .filter_map(|c| c.score.map(f64::from))
            .collect();
        let average_score = if scores.is_empty() {
            None
        } else {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            Some((mean * 100.0).round() / 100.0)
        };

        Summary {
            total_issues,
            criteria_with_issues,
            criteria_total: criteria.len(),
            passed: total_issues == 0,
            average_score,
        }
    }
}

/// A complete audit result for one URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// The normalized URL that was audited.
    pub url: String,
    /// When the report was produced.
    pub timestamp: DateTime<Utc>,
    /// Per-criterion findings.
    pub criteria: Vec<CriterionReport>,
    /// Aggregate summary.
    pub summary: Summary,
}

impl AuditReport {
    /// Assembles a report: sorts issues within each criterion and computes
    /// the summary.
    pub fn new(url: impl Into<String>, mut criteria: Vec<CriterionReport>) -> Self {
        for criterion in &mut criteria {
            criterion.sort_issues();
        }
        let summary = Summary::from_criteria(&criteria);
        AuditReport {
            url: url.into(),
            timestamp: Utc::now(),
            criteria,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: &str, score: Option<u8>) -> Issue {
        Issue {
            score,
            ..Issue::new(id, id)
        }
    }

    #[test]
    fn test_issues_sort_worst_first_with_unscored_last() {
        let mut criterion = CriterionReport {
            criterion: "performance".to_string(),
            issues: vec![
                scored("a", Some(90)),
                scored("b", None),
                scored("c", Some(10)),
                scored("d", Some(55)),
            ],
            score: Some(40),
            details: None,
        };
        criterion.sort_issues();
        let order: Vec<&str> = criterion.issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["c", "d", "a", "b"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_scores() {
        let mut criterion = CriterionReport {
            criterion: "x".to_string(),
            issues: vec![scored("first", Some(50)), scored("second", Some(50))],
            score: None,
            details: None,
        };
        criterion.sort_issues();
        assert_eq!(criterion.issues[0].id, "first");
        assert_eq!(criterion.issues[1].id, "second");
    }

    #[test]
    fn test_summary_counts_and_passed_flag() {
        let criteria = vec![
            CriterionReport {
                criterion: "a".to_string(),
                issues: vec![scored("x", None), scored("y", None)],
                score: Some(50),
                details: None,
            },
            CriterionReport {
                criterion: "b".to_string(),
                issues: vec![],
                score: Some(100),
                details: None,
            },
        ];
        let summary = Summary::from_criteria(&criteria);
        assert_eq!(summary.total_issues, 2);
        assert_eq!(summary.criteria_with_issues, 1);
        assert_eq!(summary.criteria_total, 2);
        assert!(!summary.passed);
        assert_eq!(summary.average_score, Some(75.0));
    }

    #[test]
    fn test_summary_passed_iff_zero_issues() {
        let clean = vec![CriterionReport {
            criterion: "a".to_string(),
            issues: vec![],
            score: None,
            details: None,
        }];
        let summary = Summary::from_criteria(&clean);
        assert_eq!(summary.total_issues, 0);
        assert!(summary.passed);
        assert_eq!(summary.average_score, None);
    }

    #[test]
    fn test_average_score_ignores_unscored_criteria() {
        let criteria = vec![
            CriterionReport {
                criterion: "scored".to_string(),
                issues: vec![],
                score: Some(80),
                details: None,
            },
            CriterionReport {
                criterion: "unscored".to_string(),
                issues: vec![],
                score: None,
                details: None,
            },
        ];
        let summary = Summary::from_criteria(&criteria);
        assert_eq!(summary.average_score, Some(80.0));
    }

    #[test]
    fn test_average_score_rounds_to_two_decimals() {
        let criteria: Vec<CriterionReport> = [70, 80, 95]
            .iter()
            .map(|&s| CriterionReport {
                criterion: "c".to_string(),
                issues: vec![],
                score: Some(s),
                details: None,
            })
            .collect();
        let summary = Summary::from_criteria(&criteria);
        // (70 + 80 + 95) / 3 = 81.666...
        assert_eq!(summary.average_score, Some(81.67));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = AuditReport::new("https://example.com", vec![]);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["summary"]["totalIssues"].is_number());
        assert!(json["summary"]["criteriaTotal"].is_number());
        assert!(json["summary"]["passed"].is_boolean());
    }

    #[test]
    fn test_empty_optional_fields_are_omitted() {
        let issue = Issue::new("id", "title");
        let json = serde_json::to_value(&issue).unwrap();
        assert!(json.get("score").is_none());
        assert!(json.get("examples").is_none());
        assert!(json.get("savingsMs").is_none());
    }
}
