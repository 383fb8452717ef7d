// Shared test helpers: fake browser/engine implementations and router setup.
//
// The fakes count launch/close pairs so tests can assert the cleanup
// guarantee, and serve canned page metrics keyed off the inspection script.

// Each test crate uses a different subset of these helpers
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};

use site_pulse::audit::{
    EngineInvoker, LighthouseDriver, MockAuditDriver, UxAuditDriver,
};
use site_pulse::browser::{BrowserHandle, BrowserLauncher, Page};
use site_pulse::error_handling::{AuditError, AuditStats};
use site_pulse::i18n::Translations;
use site_pulse::server::{build_router, AppState};

/// How a fake browser misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    None,
    FailLaunch,
    NavigationTimeout,
    EvaluateFails,
}

/// Observed launch/close counts of a fake launcher.
pub struct BrowserProbe {
    pub launches: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

impl BrowserProbe {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Fake browser launcher with a configurable failure stage.
pub struct FakeLauncher {
    mode: FailureMode,
    available: bool,
    launches: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl FakeLauncher {
    pub fn new(mode: FailureMode) -> (Arc<Self>, BrowserProbe) {
        let launches = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let launcher = Arc::new(FakeLauncher {
            mode,
            available: true,
            launches: launches.clone(),
            closes: closes.clone(),
        });
        (
            launcher,
            BrowserProbe { launches, closes },
        )
    }

    pub fn healthy() -> (Arc<Self>, BrowserProbe) {
        Self::new(FailureMode::None)
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(FakeLauncher {
            mode: FailureMode::None,
            available: false,
            launches: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>, AuditError> {
        if !self.available {
            return Err(AuditError::BrowserUnavailable);
        }
        if self.mode == FailureMode::FailLaunch {
            return Err(AuditError::LaunchFailure("fake launch refused".to_string()));
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeBrowserHandle {
            mode: self.mode,
            closed: false,
            closes: self.closes.clone(),
        }))
    }

    fn available(&self) -> bool {
        self.available
    }
}

pub struct FakeBrowserHandle {
    mode: FailureMode,
    closed: bool,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserHandle for FakeBrowserHandle {
    fn debug_port(&self) -> u16 {
        9222
    }

    async fn open_page(&mut self) -> Result<Box<dyn Page>, AuditError> {
        Ok(Box::new(FakePage { mode: self.mode }))
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct FakePage {
    mode: FailureMode,
}

#[async_trait]
impl Page for FakePage {
    async fn navigate(&self, _url: &str, budget: Duration) -> Result<(), AuditError> {
        if self.mode == FailureMode::NavigationTimeout {
            return Err(AuditError::NavigationTimeout(budget));
        }
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, AuditError> {
        if self.mode == FailureMode::EvaluateFails {
            return Err(AuditError::AuditFailure(
                "fake evaluation failed".to_string(),
            ));
        }
        Ok(healthy_page_metrics(expression))
    }

    async fn set_device_metrics(
        &self,
        _width: u32,
        _height: u32,
        _mobile: bool,
    ) -> Result<(), AuditError> {
        Ok(())
    }

    async fn clear_device_metrics(&self) -> Result<(), AuditError> {
        Ok(())
    }
}

/// Canned measurements of a well-built page, dispatched on a marker unique
/// to each inspection script.
pub fn healthy_page_metrics(expression: &str) -> Value {
    if expression.contains("h1Count") {
        json!({"h1Count": 1, "headingCount": 8, "h1FontPx": 32.0,
               "bodyFontPx": 16.0, "hasCallToAction": true})
    } else if expression.contains("navLinkCount") {
        json!({"hasNav": true, "navSticky": true, "navLinkCount": 6,
               "hasBreadcrumbs": true, "hasSearch": true})
    } else if expression.contains("smallTextCount") {
        json!({"baseFontPx": 16.0, "lineHeightPx": 24.0, "smallTextCount": 0})
    } else if expression.contains("tapTargetCount") {
        json!({"tapTargetCount": 40, "smallTapTargets": 0,
               "smallTapTargetSamples": [], "hasHoverStyles": true, "hasFocusStyles": true})
    } else if expression.contains("hasViewportMeta") {
        json!({"hasViewportMeta": true, "horizontalScroll": false, "hasHamburgerMenu": true})
    } else if expression.contains("horizontalScroll") {
        json!({"horizontalScroll": false})
    } else if expression.contains("imageCount") {
        json!({"imageCount": 5, "imagesWithAlt": 5, "landmarkCount": 4,
               "formFieldCount": 2, "labelledFieldCount": 2,
               "interactiveCount": 20, "unnamedInteractiveCount": 0})
    } else {
        Value::Null
    }
}

/// How the fake engine behaves.
pub enum EngineBehavior {
    Result(Value),
    Fails,
    Unavailable,
}

pub struct FakeEngine {
    behavior: EngineBehavior,
}

impl FakeEngine {
    pub fn new(behavior: EngineBehavior) -> Arc<Self> {
        Arc::new(FakeEngine { behavior })
    }
}

#[async_trait]
impl EngineInvoker for FakeEngine {
    async fn run(&self, _url: &str, _debug_port: u16) -> Result<Value, AuditError> {
        match &self.behavior {
            EngineBehavior::Result(value) => Ok(value.clone()),
            EngineBehavior::Fails => Err(AuditError::AuditFailure(
                "fake engine exploded".to_string(),
            )),
            EngineBehavior::Unavailable => Err(AuditError::EngineUnavailable(
                "fake engine missing".to_string(),
            )),
        }
    }

    fn available(&self) -> bool {
        !matches!(self.behavior, EngineBehavior::Unavailable)
    }
}

/// A minimal engine result with one finding per category.
pub fn sample_engine_result() -> Value {
    json!({
        "categories": {
            "performance": {
                "score": 0.6,
                "auditRefs": [{"id": "render-blocking-resources"}]
            },
            "accessibility": {"score": 0.85, "auditRefs": [{"id": "image-alt"}]},
            "best-practices": {"score": 1.0, "auditRefs": []},
            "seo": {"score": 0.95, "auditRefs": []}
        },
        "audits": {
            "render-blocking-resources": {
                "score": 0.2,
                "scoreDisplayMode": "opportunity",
                "title": "Eliminate render-blocking resources",
                "description": "See [the guide](https://web.dev/render-blocking/).",
                "details": {"overallSavingsMs": 450.0, "items": [{"url": "app.css"}]}
            },
            "image-alt": {
                "score": 0.0,
                "scoreDisplayMode": "binary",
                "title": "Image elements have [alt] attributes"
            }
        }
    })
}

pub fn lang_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("lang")
}

pub fn test_translations() -> Arc<Translations> {
    Arc::new(Translations::load(&lang_dir()).expect("bundled locale tables must load"))
}

/// App state wired to the given fakes, with a seeded mock driver.
pub fn test_state(
    launcher: Arc<dyn BrowserLauncher>,
    engine: Arc<dyn EngineInvoker>,
) -> AppState {
    AppState {
        translations: test_translations(),
        stats: Arc::new(AuditStats::new()),
        mock: Arc::new(MockAuditDriver::new(Some(42))),
        lighthouse: Arc::new(LighthouseDriver::new(launcher.clone(), engine)),
        ux: Arc::new(UxAuditDriver::new(launcher)),
        expose_errors: false,
    }
}

/// Router over fakes that never fail.
pub fn healthy_router() -> Router {
    let (launcher, _probe) = FakeLauncher::healthy();
    let engine = FakeEngine::new(EngineBehavior::Result(sample_engine_result()));
    build_router(test_state(launcher, engine), lang_dir(), None)
}
