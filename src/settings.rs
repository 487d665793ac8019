//! Crawler settings and the snapshot store shared by concurrent checks

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// Scheduling knobs consumed by the tracking engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Delay between scheduled passes
    pub interval: Duration,
    /// Upper bound for one pass over all tracked streams
    pub single_pass_timeout: Duration,
    pub paused: bool,
    /// Skip passes while nothing is tracked
    pub pause_idle: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            single_pass_timeout: Duration::from_secs(30),
            paused: false,
            pause_idle: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlerSettings {
    pub session: SessionSettings,
}

impl CrawlerSettings {
    pub fn single_pass_timeout(&self) -> Duration {
        self.session.single_pass_timeout
    }
}

/// Holds the current settings snapshot
///
/// Readers get an `Arc` to an immutable snapshot; writers swap in a whole new
/// one. A snapshot is never mutated after it is published.
#[derive(Debug, Default)]
pub struct SettingsStore {
    current: RwLock<Arc<CrawlerSettings>>,
}

impl SettingsStore {
    pub fn new(settings: CrawlerSettings) -> Self {
        Self {
            current: RwLock::new(Arc::new(settings)),
        }
    }

    pub fn load(&self) -> Arc<CrawlerSettings> {
        self.current.read().clone()
    }

    pub fn store(&self, settings: CrawlerSettings) {
        *self.current.write() = Arc::new(settings);
    }

    /// Publishes a snapshot derived from the current one, without losing
    /// concurrent updates.
    pub fn update<F>(&self, f: F) -> Arc<CrawlerSettings>
    where
        F: FnOnce(&CrawlerSettings) -> CrawlerSettings,
    {
        let mut current = self.current.write();
        let next = Arc::new(f(&current));
        *current = next.clone();
        next
    }
}
