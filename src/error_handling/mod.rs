//! Error taxonomy and audit statistics.
//!
//! All driver failures funnel into [`AuditError`], which the HTTP façade
//! maps onto status codes. [`AuditStats`] tracks counters for the `/status`
//! and `/metrics` endpoints.

mod stats;
mod types;

pub use stats::{AuditCounter, AuditStats};
pub use types::{AuditError, InitializationError};
