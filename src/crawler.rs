//! HLS crawler: the hooks the tracking engine calls for stream handles.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::context::CheckContext;
use crate::fetch::{FetchError, Fetcher, HttpConfig, HttpFetcher};
use crate::handle::{Handle, HandleKind};
use crate::hls::{self, CheckError};
use crate::observability::Metrics;
use crate::settings::{CrawlerSettings, SettingsStore};
use crate::tracking::{Entity, EntityData, Order, TrackedHandle, TrackingError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] FetchError),
}

/// Construction parameters for [`HlsCrawler`]
#[derive(Clone, Default)]
pub struct CrawlerConfig {
    /// Fetch capability; when absent an [`HttpFetcher`] is built from `http`.
    pub fetcher: Option<Arc<dyn Fetcher>>,
    pub http: HttpConfig,
    /// Falls back to [`CrawlerSettings::default`]
    pub settings: Option<CrawlerSettings>,
}

pub struct HlsCrawler {
    client: Arc<dyn Fetcher>,
    settings: SettingsStore,
    metrics: Arc<Metrics>,
}

impl HlsCrawler {
    pub fn new(config: CrawlerConfig) -> Result<Self, BuildError> {
        let client: Arc<dyn Fetcher> = match config.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(&config.http)?),
        };

        Ok(Self {
            client,
            settings: SettingsStore::new(config.settings.unwrap_or_default()),
            metrics: Arc::new(Metrics::new()),
        })
    }

    pub fn settings(&self) -> Arc<CrawlerSettings> {
        self.settings.load()
    }

    pub fn set_settings(&self, settings: CrawlerSettings) {
        self.settings.store(settings);
    }

    pub fn update_settings<F>(&self, f: F) -> Arc<CrawlerSettings>
    where
        F: FnOnce(&CrawlerSettings) -> CrawlerSettings,
    {
        self.settings.update(f)
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Runs one availability check against the configured client
    pub async fn check_hls(
        &self,
        ctx: Option<&CheckContext>,
        stream_url: &str,
    ) -> Result<bool, CheckError> {
        hls::check_availability(ctx, Some(self.client.as_ref()), stream_url).await
    }

    /// Accepts track/untrack orders for valid stream handles only
    pub fn on_order(&self, order: &Order) -> Result<(), TrackingError> {
        checkable(order.handle())?;
        Ok(())
    }

    /// Checks one entity and writes its liveness record back
    ///
    /// An invalid handle leaves `entity.data` untouched. Otherwise the record is
    /// always rewritten, and a failed check keeps the previous verdict.
    pub async fn on_check(
        &self,
        ctx: Option<&CheckContext>,
        entity: &mut Entity,
    ) -> Result<(), TrackingError> {
        let handle = checkable(&entity.handle)?;

        let mut data = EntityData::load(entity.data.as_ref());
        let result = self.refresh(ctx, handle, &mut data).await;
        entity.data = Some(data.into());

        result
    }

    async fn refresh(
        &self,
        ctx: Option<&CheckContext>,
        handle: &Handle,
        data: &mut EntityData,
    ) -> Result<(), TrackingError> {
        self.metrics.check_run();

        match self.check_hls(ctx, &handle.value).await {
            Ok(available) => {
                data.live = available;
                if available {
                    self.metrics.check_live();
                }
                debug!(stream_url = %handle.value, available, "Stream checked");
                Ok(())
            }
            Err(e) => {
                self.metrics.check_failed();
                warn!(stream_url = %handle.value, live = data.live, error = %e, "Stream check failed");
                Err(e.into())
            }
        }
    }
}

fn checkable(handle: &TrackedHandle) -> Result<&Handle, TrackingError> {
    handle
        .as_hls()
        .filter(|handle| handle.valid() && handle.kind == HandleKind::StreamUrl)
        .ok_or(TrackingError::InvalidHandle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextError;
    use crate::fetch::{FetchResponse, HeaderMap, Method};
    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const LIVE: &str = "#EXTM3U\n#EXT-X-MEDIA:TYPE=AUDIO,URI=\"a.m3u8\"\n";

    /// Serves `LIVE` with a fixed status, or fails every request
    struct StubFetcher {
        status: Option<u16>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn status(status: u16) -> Arc<Self> {
            Arc::new(Self {
                status: Some(status),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                status: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn request(
            &self,
            _ctx: &CheckContext,
            _method: Method,
            _url: &str,
            _headers: Option<HeaderMap>,
            _body: Option<Bytes>,
        ) -> Result<FetchResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.status {
                Some(status) => Ok(FetchResponse::new(status, LIVE.as_bytes())),
                None => Err(FetchError::Timeout),
            }
        }
    }

    fn crawler(fetcher: Arc<StubFetcher>) -> HlsCrawler {
        let fetcher: Arc<dyn Fetcher> = fetcher;
        HlsCrawler::new(CrawlerConfig {
            fetcher: Some(fetcher),
            ..CrawlerConfig::default()
        })
        .unwrap()
    }

    fn stream_entity(live: bool) -> Entity {
        Entity {
            handle: Handle::stream_url("https://example.com/live.m3u8").into(),
            data: Some(json!({ "live": live })),
        }
    }

    #[test]
    fn test_default_settings_when_absent() {
        let crawler = crawler(StubFetcher::status(200));
        assert_eq!(*crawler.settings(), CrawlerSettings::default());
    }

    #[test]
    fn test_set_settings() {
        let crawler = crawler(StubFetcher::status(200));
        let mut settings = CrawlerSettings::default();
        settings.session.interval = Duration::from_secs(5);

        crawler.set_settings(settings.clone());
        assert_eq!(*crawler.settings(), settings);
    }

    #[test]
    fn test_on_order() {
        let crawler = crawler(StubFetcher::status(200));

        let valid = Handle::stream_url("https://example.com/live.m3u8");
        assert!(crawler.on_order(&Order::Track(valid.clone().into())).is_ok());
        assert!(crawler.on_order(&Order::Untrack(valid.into())).is_ok());

        let empty = Handle::stream_url("");
        assert!(crawler.on_order(&Order::Track(empty.into())).unwrap_err().is_invalid_handle());

        let foreign = TrackedHandle::Foreign {
            source: "twitch".to_string(),
            key: "channel".to_string(),
        };
        assert!(crawler.on_order(&Order::Track(foreign)).unwrap_err().is_invalid_handle());
    }

    #[tokio::test]
    async fn test_on_check_writes_fresh_verdict() {
        let crawler = crawler(StubFetcher::status(200));
        let mut entity = stream_entity(false);

        crawler.on_check(None, &mut entity).await.unwrap();

        assert_eq!(entity.data, Some(json!({ "live": true })));
        assert_eq!(crawler.metrics().snapshot().checks_live, 1);
    }

    #[tokio::test]
    async fn test_on_check_not_live_overwrites() {
        let crawler = crawler(StubFetcher::status(404));
        let mut entity = stream_entity(true);

        crawler.on_check(None, &mut entity).await.unwrap();

        assert!(!entity.live());
    }

    #[tokio::test]
    async fn test_on_check_starts_from_default() {
        let crawler = crawler(StubFetcher::status(200));
        let mut entity = Entity::new(Handle::stream_url("https://example.com/live.m3u8"));

        crawler.on_check(None, &mut entity).await.unwrap();

        assert!(entity.live());
    }

    #[tokio::test]
    async fn test_invalid_handle_leaves_state_untouched() {
        let fetcher = StubFetcher::status(200);
        let crawler = crawler(fetcher.clone());

        let prior = json!({ "live": true, "extra": [1, 2] });
        let mut entities = vec![
            Entity {
                handle: Handle::stream_url("").into(),
                data: Some(prior.clone()),
            },
            Entity {
                handle: Handle {
                    kind: HandleKind::Unknown(9),
                    value: "https://example.com/live.m3u8".to_string(),
                }
                .into(),
                data: Some(prior.clone()),
            },
            Entity {
                handle: TrackedHandle::Foreign {
                    source: "twitch".to_string(),
                    key: "channel".to_string(),
                },
                data: Some(prior.clone()),
            },
        ];

        for entity in &mut entities {
            let before = serde_json::to_string(&entity.data).unwrap();
            let err = crawler.on_check(None, entity).await.unwrap_err();

            assert!(err.is_invalid_handle());
            assert_eq!(serde_json::to_string(&entity.data).unwrap(), before);
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_check_keeps_prior_verdict() {
        let crawler = crawler(StubFetcher::failing());
        let mut entity = stream_entity(true);

        let err = crawler.on_check(None, &mut entity).await.unwrap_err();

        assert!(matches!(err, TrackingError::Check(CheckError::Fetch(FetchError::Timeout))));
        assert_eq!(entity.data, Some(json!({ "live": true })));
        assert_eq!(crawler.metrics().snapshot().checks_failed, 1);
    }

    #[tokio::test]
    async fn test_invalid_url_keeps_prior_verdict() {
        let crawler = crawler(StubFetcher::status(200));
        let mut entity = Entity {
            handle: Handle::stream_url("inv@lid").into(),
            data: Some(json!({ "live": true })),
        };

        let err = crawler.on_check(None, &mut entity).await.unwrap_err();

        assert!(matches!(err, TrackingError::Check(CheckError::InvalidStreamUrl)));
        assert!(entity.live());
    }

    #[tokio::test]
    async fn test_failed_check_normalizes_foreign_shaped_state() {
        let crawler = crawler(StubFetcher::failing());
        let mut entity = Entity {
            handle: Handle::stream_url("https://example.com/live.m3u8").into(),
            data: Some(json!("not a record")),
        };

        assert!(crawler.on_check(None, &mut entity).await.is_err());
        assert_eq!(entity.data, Some(json!({ "live": false })));
    }

    #[tokio::test]
    async fn test_cancelled_check_keeps_prior_verdict() {
        let fetcher = StubFetcher::status(200);
        let crawler = crawler(fetcher.clone());
        let mut entity = stream_entity(true);
        let ctx = CheckContext::background();
        ctx.cancel();

        let err = crawler.on_check(Some(&ctx), &mut entity).await.unwrap_err();

        assert!(matches!(err, TrackingError::Check(CheckError::Context(ContextError::Cancelled))));
        assert!(entity.live());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }
}
