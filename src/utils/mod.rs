//! Utility module: errors, logging, metrics, and serde helpers.

pub mod errors;
pub mod metrics;
pub mod logging;
pub mod serde_helpers;

pub use errors::{IntegrityFault, LedgerError, Result};
pub use metrics::{MetricsRegistry, MetricsSnapshot, METRICS};
pub use logging::init_logging;
