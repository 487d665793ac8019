//! Polling engine that drives [`HlsCrawler`] over a set of tracked streams
//!
//! Each pass checks every tracked entity concurrently under one
//! [`CheckContext`] bounded by the single-pass timeout. Checks of the same
//! entity never overlap: each entity sits behind its own async mutex.
//! Outcomes are recorded as [`StreamStatus`] snapshots and broadcast to
//! listeners.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::context::CheckContext;
use crate::crawler::HlsCrawler;
use crate::handle::Handle;
use crate::tracking::{Entity, Order, TrackedHandle, TrackingError};

const RESULT_CHANNEL_CAPACITY: usize = 256;

/// Latest known state of one tracked stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamStatus {
    pub handle: String,
    pub url: String,
    pub live: bool,
    pub error: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
}

/// Result of checking one entity during a pass
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub handle: Handle,
    pub live: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
struct TrackedEntry {
    handle: Handle,
    entity: Arc<Mutex<Entity>>,
}

pub struct Tracker {
    crawler: Arc<HlsCrawler>,
    entries: RwLock<Vec<TrackedEntry>>,
    statuses: RwLock<BTreeMap<String, StreamStatus>>,
    results: broadcast::Sender<CheckOutcome>,
}

impl Tracker {
    pub fn new(crawler: Arc<HlsCrawler>) -> Self {
        let (results, _) = broadcast::channel(RESULT_CHANNEL_CAPACITY);
        Self {
            crawler,
            entries: RwLock::new(Vec::new()),
            statuses: RwLock::new(BTreeMap::new()),
            results,
        }
    }

    pub fn crawler(&self) -> &Arc<HlsCrawler> {
        &self.crawler
    }

    /// Starts tracking `handle`. Returns `false` if it was already tracked.
    pub fn track(&self, handle: Handle) -> Result<bool, TrackingError> {
        let tracked = TrackedHandle::Hls(handle.clone());
        self.crawler.on_order(&Order::Track(tracked.clone()))?;

        let mut entries = self.entries.write();
        if entries.iter().any(|entry| entry.handle.equal(&tracked)) {
            return Ok(false);
        }

        self.statuses.write().insert(
            handle.to_string(),
            StreamStatus {
                handle: handle.to_string(),
                url: handle.value.clone(),
                live: false,
                error: None,
                checked_at: None,
            },
        );
        entries.push(TrackedEntry {
            handle,
            entity: Arc::new(Mutex::new(Entity::new(tracked))),
        });

        Ok(true)
    }

    /// Stops tracking `handle`. Returns `false` if it was not tracked.
    pub fn untrack(&self, handle: &Handle) -> Result<bool, TrackingError> {
        let tracked = TrackedHandle::Hls(handle.clone());
        self.crawler.on_order(&Order::Untrack(tracked.clone()))?;

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|entry| !entry.handle.equal(&tracked));
        if entries.len() == before {
            return Ok(false);
        }

        self.statuses.write().remove(&handle.to_string());
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn statuses(&self) -> Vec<StreamStatus> {
        self.statuses.read().values().cloned().collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CheckOutcome> {
        self.results.subscribe()
    }

    /// Checks every tracked entity once
    pub async fn run_pass(&self, shutdown: &CancellationToken) -> Vec<CheckOutcome> {
        let settings = self.crawler.settings();
        let ctx = CheckContext::with_token(shutdown.child_token())
            .with_timeout(settings.single_pass_timeout());

        let entries = self.entries.read().clone();
        let mut set = JoinSet::new();
        for entry in entries {
            let crawler = self.crawler.clone();
            let ctx = ctx.clone();
            set.spawn(async move {
                let mut entity = entry.entity.lock().await;
                let result = crawler.on_check(Some(&ctx), &mut entity).await;
                CheckOutcome {
                    handle: entry.handle,
                    live: entity.live(),
                    error: result.err().map(|e| e.to_string()),
                }
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => {
                    self.record(&outcome);
                    outcomes.push(outcome);
                }
                Err(e) => error!(error = %e, "Check task failed"),
            }
        }

        outcomes
    }

    /// Runs passes every `interval` until `shutdown` is cancelled
    ///
    /// Settings are re-read before each pass, so pausing or changing the
    /// interval takes effect on the next cycle.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(streams = self.len(), "Tracker started");

        loop {
            let settings = self.crawler.settings();
            let session = &settings.session;

            if session.paused {
                debug!("Tracker paused, skipping pass");
            } else if session.pause_idle && self.is_empty() {
                debug!("Nothing tracked, skipping pass");
            } else {
                let outcomes = self.run_pass(&shutdown).await;
                let live = outcomes.iter().filter(|outcome| outcome.live).count();
                let failed = outcomes.iter().filter(|outcome| outcome.error.is_some()).count();
                info!(checked = outcomes.len(), live, failed, "Pass completed");
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(session.interval) => {}
            }
        }

        info!("Tracker stopped");
    }

    fn record(&self, outcome: &CheckOutcome) {
        let key = outcome.handle.to_string();
        if let Some(status) = self.statuses.write().get_mut(&key) {
            status.live = outcome.live;
            status.error = outcome.error.clone();
            status.checked_at = Some(Utc::now());
        }

        // No listeners is fine.
        let _ = self.results.send(outcome.clone());
    }
}
