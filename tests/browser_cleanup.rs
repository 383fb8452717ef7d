// Resource discipline: every successful browser launch is matched by
// exactly one close, regardless of which audit stage failed.

#[path = "helpers.rs"]
mod helpers;

use std::sync::Arc;

use helpers::{
    sample_engine_result, test_translations, EngineBehavior, FailureMode, FakeEngine,
    FakeLauncher,
};
use site_pulse::audit::{LighthouseDriver, UxAuditDriver};
use site_pulse::error_handling::AuditError;
use site_pulse::i18n::Locale;

#[tokio::test]
async fn test_ux_success_closes_browser_once() {
    let (launcher, probe) = FakeLauncher::healthy();
    let driver = UxAuditDriver::new(launcher);
    let translations = test_translations();

    driver
        .run("example.com", Locale::En, &translations)
        .await
        .unwrap();
    assert_eq!(probe.launches(), 1);
    assert_eq!(probe.closes(), 1);
}

#[tokio::test]
async fn test_ux_navigation_timeout_still_closes_browser() {
    let (launcher, probe) = FakeLauncher::new(FailureMode::NavigationTimeout);
    let driver = UxAuditDriver::new(launcher);
    let translations = test_translations();

    let err = driver
        .run("example.com", Locale::En, &translations)
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::NavigationTimeout(_)));
    assert_eq!(probe.launches(), 1);
    assert_eq!(probe.closes(), 1);
}

#[tokio::test]
async fn test_ux_evaluation_failure_still_closes_browser() {
    let (launcher, probe) = FakeLauncher::new(FailureMode::EvaluateFails);
    let driver = UxAuditDriver::new(launcher);
    let translations = test_translations();

    let err = driver
        .run("example.com", Locale::En, &translations)
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::AuditFailure(_)));
    assert_eq!(probe.launches(), 1);
    assert_eq!(probe.closes(), 1);
}

#[tokio::test]
async fn test_ux_launch_failure_means_nothing_to_close() {
    let (launcher, probe) = FakeLauncher::new(FailureMode::FailLaunch);
    let driver = UxAuditDriver::new(launcher);
    let translations = test_translations();

    let err = driver
        .run("example.com", Locale::En, &translations)
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::LaunchFailure(_)));
    assert_eq!(probe.launches(), 0);
    assert_eq!(probe.closes(), 0);
}

#[tokio::test]
async fn test_ux_invalid_url_never_launches() {
    let (launcher, probe) = FakeLauncher::healthy();
    let driver = UxAuditDriver::new(launcher);
    let translations = test_translations();

    let err = driver
        .run("not a url at all!!!", Locale::En, &translations)
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::InvalidUrl(_)));
    assert_eq!(probe.launches(), 0);
    assert_eq!(probe.closes(), 0);
}

#[tokio::test]
async fn test_lighthouse_success_closes_browser_once() {
    let (launcher, probe) = FakeLauncher::healthy();
    let engine = FakeEngine::new(EngineBehavior::Result(sample_engine_result()));
    let driver = LighthouseDriver::new(launcher, engine);
    let translations = test_translations();

    driver
        .run("example.com", Locale::En, &translations)
        .await
        .unwrap();
    assert_eq!(probe.launches(), 1);
    assert_eq!(probe.closes(), 1);
}

#[tokio::test]
async fn test_lighthouse_engine_failure_still_closes_browser() {
    let (launcher, probe) = FakeLauncher::healthy();
    let engine = FakeEngine::new(EngineBehavior::Fails);
    let driver = LighthouseDriver::new(launcher, engine);
    let translations = test_translations();

    let err = driver
        .run("example.com", Locale::En, &translations)
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::AuditFailure(_)));
    assert_eq!(probe.launches(), 1);
    assert_eq!(probe.closes(), 1);
}

#[tokio::test]
async fn test_lighthouse_unparseable_result_still_closes_browser() {
    let (launcher, probe) = FakeLauncher::healthy();
    // Engine answers, but with a result the post-processing rejects
    let engine = FakeEngine::new(EngineBehavior::Result(serde_json::json!({"junk": true})));
    let driver = LighthouseDriver::new(launcher, engine);
    let translations = test_translations();

    let err = driver
        .run("example.com", Locale::En, &translations)
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::AuditFailure(_)));
    assert_eq!(probe.launches(), 1);
    assert_eq!(probe.closes(), 1);
}

#[tokio::test]
async fn test_lighthouse_missing_engine_never_launches_browser() {
    let (launcher, probe) = FakeLauncher::healthy();
    let engine = FakeEngine::new(EngineBehavior::Unavailable);
    let driver = LighthouseDriver::new(launcher, engine);
    let translations = test_translations();

    let err = driver
        .run("example.com", Locale::En, &translations)
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::EngineUnavailable(_)));
    assert_eq!(probe.launches(), 0);
    assert_eq!(probe.closes(), 0);
}

#[tokio::test]
async fn test_concurrent_ux_audits_pair_launches_and_closes() {
    let (launcher, probe) = FakeLauncher::healthy();
    let driver = Arc::new(UxAuditDriver::new(launcher));
    let translations = test_translations();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let driver = driver.clone();
        let translations = translations.clone();
        handles.push(tokio::spawn(async move {
            driver.run("example.com", Locale::En, &translations).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(probe.launches(), 4);
    assert_eq!(probe.closes(), 4);
}
