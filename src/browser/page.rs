//! [`Page`] implementation backed by a DevTools session.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use super::cdp::PageSession;
use super::Page;
use crate::config::NETWORK_SETTLE_DELAY;
use crate::error_handling::AuditError;

/// A real browser page driven over CDP.
pub struct CdpPage {
    session: PageSession,
}

impl CdpPage {
    pub(crate) fn new(session: PageSession) -> Self {
        CdpPage { session }
    }
}

#[async_trait]
impl Page for CdpPage {
    async fn navigate(&self, url: &str, budget: Duration) -> Result<(), AuditError> {
        let settle = async {
            self.session.navigate(url).await?;
            self.session.wait_for_ready().await?;
            // readyState says nothing about stragglers; give late requests
            // a moment to land before the inspection routines run
            tokio::time::sleep(NETWORK_SETTLE_DELAY).await;
            Ok::<(), AuditError>(())
        };
        match tokio::time::timeout(budget, settle).await {
            Ok(result) => result,
            Err(_) => Err(AuditError::NavigationTimeout(budget)),
        }?;
        debug!("Navigation to {url} settled");
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, AuditError> {
        Ok(self.session.evaluate(expression).await?)
    }

    async fn set_device_metrics(
        &self,
        width: u32,
        height: u32,
        mobile: bool,
    ) -> Result<(), AuditError> {
        Ok(self.session.set_device_metrics(width, height, mobile).await?)
    }

    async fn clear_device_metrics(&self) -> Result<(), AuditError> {
        Ok(self.session.clear_device_metrics().await?)
    }
}
