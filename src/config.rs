//! Service configuration and shared constants.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

// constants (used as defaults)
/// Default TCP port for the HTTP façade.
pub const DEFAULT_PORT: u16 = 3000;
/// Blanket per-request timeout applied by the façade.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// Navigation budget for the UX driver. Navigations that do not settle
/// within this window fail the audit with `NavigationTimeout`.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
/// Wall-clock budget for one `lighthouse` CLI invocation.
pub const ENGINE_TIMEOUT: Duration = Duration::from_secs(90);
/// Artificial delay of the mock driver, emulating a real audit.
pub const MOCK_AUDIT_DELAY: Duration = Duration::from_secs(1);

// Browser launch
/// Poll interval while waiting for the debug endpoint to come up.
pub const BROWSER_READY_POLL_INTERVAL: Duration = Duration::from_millis(200);
/// Number of readiness polls before the launch is declared failed.
pub const BROWSER_READY_MAX_ATTEMPTS: usize = 30;
/// Per-command timeout on the CDP channel.
pub const CDP_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
/// Settle delay after `document.readyState` reaches "complete"; stands in
/// for network-idle on pages that keep issuing late requests.
pub const NETWORK_SETTLE_DELAY: Duration = Duration::from_millis(500);

// Emulated mobile viewport for the UX mobile-adaptation routine
/// Emulated mobile viewport width in CSS pixels.
pub const MOBILE_VIEWPORT_WIDTH: u32 = 375;
/// Emulated mobile viewport height in CSS pixels.
pub const MOBILE_VIEWPORT_HEIGHT: u32 = 667;

// Report limits
/// Maximum number of offending DOM items attached to one issue.
pub const MAX_ISSUE_EXAMPLES: usize = 5;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to
/// most verbose (Trace). Used with the `--log-level` CLI option.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Command-line options and configuration.
///
/// This struct is automatically generated by `clap` from the field
/// attributes. All options have sensible defaults and can be overridden via
/// command-line flags.
///
/// # Examples
///
/// ```bash
/// # Basic usage
/// site_pulse
///
/// # Custom port and exposed error details
/// site_pulse --port 8080 --expose-errors
///
/// # Deterministic mock audits for testing
/// site_pulse --mock-seed 42
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "site_pulse",
    about = "Runs browser-based website audits and serves structured JSON reports."
)]
pub struct Config {
    /// TCP port the HTTP façade binds to
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Directory holding locale tables (`en.json`, `ru.json`)
    #[arg(long, value_parser, default_value = "./lang")]
    pub lang_dir: PathBuf,

    /// Directory of static assets served under `/` (optional)
    #[arg(long, value_parser)]
    pub public_dir: Option<PathBuf>,

    /// Chromium binary path. Overrides autodetection.
    ///
    /// When unset, conventional install locations are probed, then the
    /// `CHROME_PATH` environment variable.
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Lighthouse CLI binary (looked up on PATH when not absolute)
    #[arg(long, default_value = "lighthouse")]
    pub lighthouse_bin: PathBuf,

    /// Seed for the mock driver's PRNG.
    ///
    /// When set, mock audits become fully deterministic, which tests rely
    /// on. When unset, the PRNG is seeded from OS entropy.
    #[arg(long)]
    pub mock_seed: Option<u64>,

    /// Include error chains in failure responses.
    ///
    /// Off by default; intended for development. Clients always receive the
    /// localized top-level message either way.
    #[arg(long, default_value_t = false)]
    pub expose_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            lang_dir: PathBuf::from("./lang"),
            public_dir: None,
            chrome_path: None,
            lighthouse_bin: PathBuf::from("lighthouse"),
            mock_seed: None,
            expose_errors: false,
        }
    }
}

/// A configuration validation failure, naming the offending field.
#[derive(Debug)]
pub struct ValidationError {
    /// The `Config` field that failed validation.
    pub field: &'static str,
    /// Human-readable description of the constraint that was violated.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl Config {
    /// Validates field values that clap cannot check on its own.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError {
                field: "port",
                message: "must be greater than 0".to_string(),
            });
        }
        if !self.lang_dir.as_os_str().is_empty() && !self.lang_dir.is_dir() {
            return Err(ValidationError {
                field: "lang_dir",
                message: format!("{} is not a directory", self.lang_dir.display()),
            });
        }
        if let Some(dir) = &self.public_dir {
            if !dir.is_dir() {
                return Err(ValidationError {
                    field: "public_dir",
                    message: format!("{} is not a directory", dir.display()),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid_apart_from_lang_dir() {
        // Default lang_dir points at ./lang which may not exist in the test
        // working directory; everything else must pass.
        let config = Config {
            lang_dir: std::env::temp_dir(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_port_fails_validation() {
        let config = Config {
            port: 0,
            lang_dir: std::env::temp_dir(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "port");
        assert!(err.message.contains("greater than 0"));
    }

    #[test]
    fn test_missing_lang_dir_fails_validation() {
        let config = Config {
            lang_dir: PathBuf::from("/definitely/not/a/real/dir"),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "lang_dir");
    }
}
