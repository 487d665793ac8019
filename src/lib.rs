pub mod config;
pub mod context;
pub mod crawler;
pub mod fetch;
pub mod handle;
pub mod hls;
pub mod humanize;
pub mod observability;
pub mod settings;
pub mod status;
pub mod tracker;
pub mod tracking;

pub use context::{CheckContext, ContextError};
pub use crawler::{BuildError, CrawlerConfig, HlsCrawler};
pub use handle::{Handle, HandleKind};
pub use hls::{CheckError, ManifestFlags, check_availability};
pub use settings::{CrawlerSettings, SessionSettings, SettingsStore};
pub use tracking::{Entity, EntityData, Order, TrackedHandle, TrackingError};
