//! Check counters and tracing setup

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber on stderr. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Metrics handle for recording check outcomes
#[derive(Debug, Default)]
pub struct Metrics {
    checks_run: AtomicU64,
    checks_live: AtomicU64,
    checks_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_run(&self) {
        self.checks_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn check_live(&self) {
        self.checks_live.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "checks_live", "Metric incremented");
    }

    pub fn check_failed(&self) {
        self.checks_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "checks_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            checks_run: self.checks_run.load(Ordering::Relaxed),
            checks_live: self.checks_live.load(Ordering::Relaxed),
            checks_failed: self.checks_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub checks_run: u64,
    pub checks_live: u64,
    pub checks_failed: u64,
}
