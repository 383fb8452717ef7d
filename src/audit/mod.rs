//! Audit drivers.
//!
//! Three drivers share the report model: [`mock`] fabricates heuristic
//! findings, [`lighthouse`] runs the external performance engine against a
//! launched browser, and [`ux`] drives in-page inspection routines over
//! CDP.

pub mod lighthouse;
pub mod mock;
pub mod ux;

pub use lighthouse::{EngineInvoker, LighthouseCli, LighthouseDriver};
pub use mock::MockAuditDriver;
pub use ux::UxAuditDriver;

use crate::error_handling::AuditError;

/// Target platform of a mock audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Web,
    Mobile,
}

impl Platform {
    /// Resolves the `platform` query parameter. Missing defaults to web;
    /// anything other than `web`/`mobile` is rejected.
    pub fn from_param(param: Option<&str>) -> Result<Platform, AuditError> {
        match param {
            None | Some("web") => Ok(Platform::Web),
            Some("mobile") => Ok(Platform::Mobile),
            Some(other) => Err(AuditError::InvalidPlatform(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_param_resolution() {
        assert_eq!(Platform::from_param(None).unwrap(), Platform::Web);
        assert_eq!(Platform::from_param(Some("web")).unwrap(), Platform::Web);
        assert_eq!(
            Platform::from_param(Some("mobile")).unwrap(),
            Platform::Mobile
        );
        assert!(matches!(
            Platform::from_param(Some("desktop")),
            Err(AuditError::InvalidPlatform(p)) if p == "desktop"
        ));
    }
}
