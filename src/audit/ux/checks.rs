//! In-page inspection routines.
//!
//! Each routine evaluates a JS snippet that gathers raw measurements, then
//! scores them in Rust against fixed thresholds. Scoring is a linear
//! penalty model: `100 - weight * issue_count`, floored at zero.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::Page;
use crate::config::{MOBILE_VIEWPORT_HEIGHT, MOBILE_VIEWPORT_WIDTH};
use crate::error_handling::AuditError;

/// Penalty per issue for most routines.
pub(crate) const DEFAULT_PENALTY: i32 = 25;
/// Navigation and accessibility have more candidate issues, so each one
/// costs less.
pub(crate) const SOFT_PENALTY: i32 = 20;

/// Result of one inspection routine, before localization.
#[derive(Debug)]
pub struct CheckOutcome {
    /// Triggered issue identifiers.
    pub issues: Vec<&'static str>,
    /// `100 - penalty * issues`, floored at 0.
    pub score: u8,
    /// Raw measurements the verdict was derived from.
    pub details: Value,
}

fn score_with(penalty: i32, issue_count: usize) -> u8 {
    (100 - penalty * issue_count as i32).max(0) as u8
}

fn outcome<M: Serialize>(penalty: i32, issues: Vec<&'static str>, metrics: &M) -> CheckOutcome {
    CheckOutcome {
        score: score_with(penalty, issues.len()),
        details: serde_json::to_value(metrics).unwrap_or(Value::Null),
        issues,
    }
}

async fn measure<M: for<'de> Deserialize<'de>>(
    page: &dyn Page,
    script: &str,
) -> Result<M, AuditError> {
    let raw = page.evaluate(script).await?;
    serde_json::from_value(raw)
        .map_err(|e| AuditError::AuditFailure(format!("inspection returned bad shape: {e}")))
}

// ---------------------------------------------------------------------------
// Visual hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VisualHierarchyMetrics {
    pub h1_count: usize,
    pub heading_count: usize,
    pub h1_font_px: f64,
    pub body_font_px: f64,
    pub has_call_to_action: bool,
}

const VISUAL_HIERARCHY_JS: &str = r##"
(() => {
  const px = el => parseFloat(getComputedStyle(el).fontSize) || 0;
  const h1s = document.querySelectorAll('h1');
  const headings = document.querySelectorAll('h1, h2, h3, h4, h5, h6');
  const cta = document.querySelector(
    'button, a.btn, a.button, [class*="cta" i], a[class*="btn" i], input[type="submit"]');
  return {
    h1Count: h1s.length,
    headingCount: headings.length,
    h1FontPx: h1s.length ? px(h1s[0]) : 0,
    bodyFontPx: document.body ? px(document.body) : 0,
    hasCallToAction: !!cta,
  };
})()
"##;

pub(crate) fn assess_visual_hierarchy(metrics: &VisualHierarchyMetrics) -> CheckOutcome {
    let mut issues = Vec::new();
    if metrics.h1_count == 0 {
        issues.push("ux.visual_hierarchy.no_h1");
    }
    if metrics.h1_count > 1 {
        issues.push("ux.visual_hierarchy.multiple_h1");
    }
    if metrics.h1_count > 0 && metrics.h1_font_px <= metrics.body_font_px {
        issues.push("ux.visual_hierarchy.flat_heading_scale");
    }
    if !metrics.has_call_to_action {
        issues.push("ux.visual_hierarchy.no_call_to_action");
    }
    outcome(DEFAULT_PENALTY, issues, metrics)
}

pub(crate) async fn visual_hierarchy(page: &dyn Page) -> Result<CheckOutcome, AuditError> {
    Ok(assess_visual_hierarchy(
        &measure(page, VISUAL_HIERARCHY_JS).await?,
    ))
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NavigationMetrics {
    pub has_nav: bool,
    pub nav_sticky: bool,
    pub nav_link_count: usize,
    pub has_breadcrumbs: bool,
    pub has_search: bool,
}

const NAVIGATION_JS: &str = r##"
(() => {
  const nav = document.querySelector('nav, [role="navigation"]');
  let sticky = false;
  if (nav) {
    const pos = getComputedStyle(nav).position;
    sticky = pos === 'fixed' || pos === 'sticky';
  }
  const breadcrumbs = document.querySelector(
    '.breadcrumb, .breadcrumbs, [aria-label*="breadcrumb" i], [itemtype*="BreadcrumbList"]');
  const search = document.querySelector(
    'input[type="search"], form[role="search"], [class*="search" i] input');
  return {
    hasNav: !!nav,
    navSticky: sticky,
    navLinkCount: nav ? nav.querySelectorAll('a').length : 0,
    hasBreadcrumbs: !!breadcrumbs,
    hasSearch: !!search,
  };
})()
"##;

/// Nav regions with more links than this read as overloaded.
const MAX_NAV_LINKS: usize = 10;

pub(crate) fn assess_navigation(metrics: &NavigationMetrics) -> CheckOutcome {
    let mut issues = Vec::new();
    if !metrics.has_nav {
        issues.push("ux.navigation.no_navigation");
    } else if !metrics.nav_sticky {
        issues.push("ux.navigation.nav_not_sticky");
    }
    if metrics.nav_link_count > MAX_NAV_LINKS {
        issues.push("ux.navigation.too_many_links");
    }
    if !metrics.has_breadcrumbs && !metrics.has_search {
        issues.push("ux.navigation.no_wayfinding");
    }
    outcome(SOFT_PENALTY, issues, metrics)
}

pub(crate) async fn navigation(page: &dyn Page) -> Result<CheckOutcome, AuditError> {
    Ok(assess_navigation(&measure(page, NAVIGATION_JS).await?))
}

// ---------------------------------------------------------------------------
// Typography
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TypographyMetrics {
    pub base_font_px: f64,
    pub line_height_px: f64,
    pub small_text_count: usize,
}

const TYPOGRAPHY_JS: &str = r##"
(() => {
  const style = getComputedStyle(document.body);
  const base = parseFloat(style.fontSize) || 0;
  const lineHeight = style.lineHeight === 'normal'
    ? base * 1.2
    : parseFloat(style.lineHeight) || 0;
  let small = 0;
  for (const el of document.querySelectorAll('p, span, li, a, td, label')) {
    if (!el.innerText || !el.innerText.trim()) continue;
    const fs = parseFloat(getComputedStyle(el).fontSize);
    if (fs && fs < 14) small++;
  }
  return { baseFontPx: base, lineHeightPx: lineHeight, smallTextCount: small };
})()
"##;

/// Body text below this size strains readability.
const MIN_BASE_FONT_PX: f64 = 16.0;
/// Minimum comfortable line-height ratio.
const MIN_LINE_HEIGHT_RATIO: f64 = 1.2;
/// A few fine-print nodes are normal; beyond this it is a pattern.
const MAX_SMALL_TEXT_NODES: usize = 5;

pub(crate) fn assess_typography(metrics: &TypographyMetrics) -> CheckOutcome {
    let mut issues = Vec::new();
    if metrics.base_font_px < MIN_BASE_FONT_PX {
        issues.push("ux.typography.base_font_too_small");
    }
    if metrics.base_font_px > 0.0
        && metrics.line_height_px / metrics.base_font_px < MIN_LINE_HEIGHT_RATIO
    {
        issues.push("ux.typography.line_height_too_tight");
    }
    if metrics.small_text_count > MAX_SMALL_TEXT_NODES {
        issues.push("ux.typography.widespread_small_text");
    }
    outcome(DEFAULT_PENALTY, issues, metrics)
}

pub(crate) async fn typography(page: &dyn Page) -> Result<CheckOutcome, AuditError> {
    Ok(assess_typography(&measure(page, TYPOGRAPHY_JS).await?))
}

// ---------------------------------------------------------------------------
// Interactivity
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InteractivityMetrics {
    pub tap_target_count: usize,
    pub small_tap_targets: usize,
    #[serde(default)]
    pub small_tap_target_samples: Vec<String>,
    pub has_hover_styles: bool,
    pub has_focus_styles: bool,
}

const INTERACTIVITY_JS: &str = r##"
(() => {
  const targets = document.querySelectorAll(
    'a, button, input[type="button"], input[type="submit"], [role="button"]');
  let small = 0;
  const samples = [];
  for (const el of targets) {
    const r = el.getBoundingClientRect();
    if (r.width === 0 || r.height === 0) continue;
    if (r.width < 44 || r.height < 44) {
      small++;
      if (samples.length < 5) {
        samples.push(el.tagName.toLowerCase() + (el.id ? '#' + el.id : ''));
      }
    }
  }
  let hover = false, focus = false;
  for (const sheet of document.styleSheets) {
    let rules;
    try { rules = sheet.cssRules; } catch (e) { continue; }
    if (!rules) continue;
    for (const rule of rules) {
      const sel = rule.selectorText || '';
      if (sel.includes(':hover')) hover = true;
      if (sel.includes(':focus')) focus = true;
      if (hover && focus) break;
    }
    if (hover && focus) break;
  }
  return {
    tapTargetCount: targets.length,
    smallTapTargets: small,
    smallTapTargetSamples: samples,
    hasHoverStyles: hover,
    hasFocusStyles: focus,
  };
})()
"##;

/// Share of undersized tap targets that counts as a systemic problem.
const SMALL_TARGET_RATIO: f64 = 0.2;

pub(crate) fn assess_interactivity(metrics: &InteractivityMetrics) -> CheckOutcome {
    let mut issues = Vec::new();
    if metrics.tap_target_count > 0 {
        let ratio = metrics.small_tap_targets as f64 / metrics.tap_target_count as f64;
        if ratio > SMALL_TARGET_RATIO {
            issues.push("ux.interactivity.small_tap_targets");
        }
    }
    if !metrics.has_hover_styles {
        issues.push("ux.interactivity.no_hover_styles");
    }
    if !metrics.has_focus_styles {
        issues.push("ux.interactivity.no_focus_styles");
    }
    outcome(DEFAULT_PENALTY, issues, metrics)
}

pub(crate) async fn interactivity(page: &dyn Page) -> Result<CheckOutcome, AuditError> {
    Ok(assess_interactivity(
        &measure(page, INTERACTIVITY_JS).await?,
    ))
}

// ---------------------------------------------------------------------------
// Mobile adaptation
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MobileMetrics {
    pub has_viewport_meta: bool,
    pub horizontal_scroll_desktop: bool,
    pub horizontal_scroll_mobile: bool,
    pub has_hamburger_menu: bool,
}

const MOBILE_DESKTOP_JS: &str = r##"
(() => {
  const meta = document.querySelector('meta[name="viewport"]');
  const hamburger = document.querySelector(
    '.hamburger, .menu-toggle, .navbar-toggler, [aria-label*="menu" i], button[class*="menu" i]');
  return {
    hasViewportMeta: !!meta,
    horizontalScroll: document.documentElement.scrollWidth > window.innerWidth + 1,
    hasHamburgerMenu: !!hamburger,
  };
})()
"##;

const HORIZONTAL_SCROLL_JS: &str = r##"
(() => ({ horizontalScroll: document.documentElement.scrollWidth > window.innerWidth + 1 }))()
"##;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DesktopSnapshot {
    has_viewport_meta: bool,
    horizontal_scroll: bool,
    has_hamburger_menu: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrollSnapshot {
    horizontal_scroll: bool,
}

pub(crate) fn assess_mobile(metrics: &MobileMetrics) -> CheckOutcome {
    let mut issues = Vec::new();
    if !metrics.has_viewport_meta {
        issues.push("ux.mobile.no_viewport_meta");
    }
    if metrics.horizontal_scroll_desktop {
        issues.push("ux.mobile.horizontal_scroll_desktop");
    }
    if metrics.horizontal_scroll_mobile {
        issues.push("ux.mobile.horizontal_scroll_mobile");
    }
    if !metrics.has_hamburger_menu {
        issues.push("ux.mobile.no_mobile_menu");
    }
    outcome(DEFAULT_PENALTY, issues, metrics)
}

/// Measures at the current viewport, then re-measures horizontal scroll at
/// an emulated phone viewport. The override is cleared before returning,
/// also when the mobile measurement fails.
pub(crate) async fn mobile_adaptation(page: &dyn Page) -> Result<CheckOutcome, AuditError> {
    let desktop: DesktopSnapshot = measure(page, MOBILE_DESKTOP_JS).await?;

    page.set_device_metrics(MOBILE_VIEWPORT_WIDTH, MOBILE_VIEWPORT_HEIGHT, true)
        .await?;
    let mobile: Result<ScrollSnapshot, AuditError> = measure(page, HORIZONTAL_SCROLL_JS).await;
    let restore = page.clear_device_metrics().await;
    let mobile = mobile?;
    restore?;

    Ok(assess_mobile(&MobileMetrics {
        has_viewport_meta: desktop.has_viewport_meta,
        horizontal_scroll_desktop: desktop.horizontal_scroll,
        horizontal_scroll_mobile: mobile.horizontal_scroll,
        has_hamburger_menu: desktop.has_hamburger_menu,
    }))
}

// ---------------------------------------------------------------------------
// Accessibility
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessibilityMetrics {
    pub image_count: usize,
    pub images_with_alt: usize,
    pub landmark_count: usize,
    pub form_field_count: usize,
    pub labelled_field_count: usize,
    pub interactive_count: usize,
    pub unnamed_interactive_count: usize,
}

const ACCESSIBILITY_JS: &str = r##"
(() => {
  const imgs = document.querySelectorAll('img');
  let withAlt = 0;
  for (const img of imgs) if (img.hasAttribute('alt')) withAlt++;

  const roles = { main: 'main', nav: 'navigation', header: 'banner', footer: 'contentinfo' };
  let landmarks = 0;
  for (const tag of Object.keys(roles)) {
    if (document.querySelector(tag) || document.querySelector('[role="' + roles[tag] + '"]')) {
      landmarks++;
    }
  }

  const fields = document.querySelectorAll(
    'input:not([type="hidden"]):not([type="submit"]):not([type="button"]), select, textarea');
  let labelled = 0;
  for (const el of fields) {
    const id = el.getAttribute('id');
    if ((id && document.querySelector('label[for="' + id + '"]')) ||
        el.closest('label') ||
        el.hasAttribute('aria-label') ||
        el.hasAttribute('aria-labelledby')) {
      labelled++;
    }
  }

  const interactive = document.querySelectorAll('a, button');
  let unnamed = 0;
  for (const el of interactive) {
    const text = (el.innerText || '').trim();
    if (!text && !el.hasAttribute('aria-label') &&
        !el.hasAttribute('aria-labelledby') && !el.getAttribute('title')) {
      unnamed++;
    }
  }

  return {
    imageCount: imgs.length,
    imagesWithAlt: withAlt,
    landmarkCount: landmarks,
    formFieldCount: fields.length,
    labelledFieldCount: labelled,
    interactiveCount: interactive.length,
    unnamedInteractiveCount: unnamed,
  };
})()
"##;

/// Fewer distinct landmark kinds than this means the page has no usable
/// semantic skeleton.
const MIN_LANDMARK_KINDS: usize = 2;

pub(crate) fn assess_accessibility(metrics: &AccessibilityMetrics) -> CheckOutcome {
    let mut issues = Vec::new();
    if metrics.images_with_alt < metrics.image_count {
        issues.push("ux.accessibility.images_missing_alt");
    }
    if metrics.landmark_count < MIN_LANDMARK_KINDS {
        issues.push("ux.accessibility.missing_landmarks");
    }
    if metrics.labelled_field_count < metrics.form_field_count {
        issues.push("ux.accessibility.unlabelled_form_fields");
    }
    if metrics.unnamed_interactive_count > 0 {
        issues.push("ux.accessibility.unnamed_interactive");
    }
    outcome(SOFT_PENALTY, issues, metrics)
}

pub(crate) async fn accessibility(page: &dyn Page) -> Result<CheckOutcome, AuditError> {
    Ok(assess_accessibility(
        &measure(page, ACCESSIBILITY_JS).await?,
    ))
}
