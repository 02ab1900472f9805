use std::collections::BTreeMap;
use std::sync::Arc;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use serde::Serialize;

pub const VOTES_ACCEPTED: &str = "votes_accepted";
pub const VOTES_REJECTED: &str = "votes_rejected";
pub const BLOCKS_SEALED: &str = "blocks_sealed";
pub const SEAL_RETRIES: &str = "seal_retries";
pub const POW_ATTEMPTS: &str = "pow_attempts";

pub const PENDING_VOTES: &str = "pending_votes";
pub const CHAIN_LENGTH: &str = "chain_length";

/// Point-in-time copy of every counter and gauge.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub gauges: BTreeMap<String, f64>,
}

/// Metrics registry (simple, Prometheus-style)
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    counters: Arc<Mutex<BTreeMap<String, u64>>>,
    gauges: Arc<Mutex<BTreeMap<String, f64>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_counter(&self, name: &str) {
        self.add_counter(name, 1);
    }

    pub fn add_counter(&self, name: &str, delta: u64) {
        let mut counters = self.counters.lock();
        let slot = counters.entry(name.to_string()).or_insert(0);
        *slot = slot.saturating_add(delta);
    }

    pub fn set_gauge(&self, name: &str, val: f64) {
        self.gauges.lock().insert(name.to_string(), val);
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.lock().get(name).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.lock().clone(),
            gauges: self.gauges.lock().clone(),
        }
    }
}

lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}
