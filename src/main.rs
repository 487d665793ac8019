mod cli;
mod server;

use clap::Parser;
use cli::{CheckArgs, Cli, Commands, ConfigArgs, WatchArgs};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use streamwatch::config::{Config, ConfigError};
use streamwatch::context::CheckContext;
use streamwatch::crawler::{CrawlerConfig, HlsCrawler};
use streamwatch::handle::Handle;
use streamwatch::observability;
use streamwatch::tracker::Tracker;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::warn;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => check(args).await?,
        Commands::Watch(args) => watch(args).await?,
        Commands::Config(args) => print_config(args)?,
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

async fn check(args: CheckArgs) -> Result<(), AnyError> {
    let crawler = Arc::new(HlsCrawler::new(CrawlerConfig::default())?);
    let ctx = CheckContext::background().with_timeout(args.timeout.as_duration());

    let mut set = JoinSet::new();
    for (index, url) in args.urls.into_iter().enumerate() {
        let crawler = crawler.clone();
        let ctx = ctx.clone();
        set.spawn(async move {
            let result = crawler.check_hls(Some(&ctx), &url).await;
            (index, url, result)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = set.join_next().await {
        results.push(joined?);
    }
    results.sort_by_key(|(index, ..)| *index);

    for (_, url, result) in results {
        let line = match result {
            Ok(live) => json!({ "url": url, "live": live, "error": null }),
            Err(e) => json!({ "url": url, "live": null, "error": e.to_string() }),
        };
        println!("{}", line);
    }

    Ok(())
}

async fn watch(args: WatchArgs) -> Result<(), AnyError> {
    let config = load_config(args.config)?;

    let mut settings = config.crawler_settings();
    if let Some(interval) = args.interval {
        if interval.is_zero() {
            return Err("--interval must be greater than zero".into());
        }
        settings.session.interval = interval.as_duration();
    }

    let crawler = HlsCrawler::new(CrawlerConfig {
        fetcher: None,
        http: config.http.to_http_config(),
        settings: Some(settings),
    })?;
    let tracker = Arc::new(Tracker::new(Arc::new(crawler)));

    for url in config.streams.iter().chain(args.urls.iter()) {
        if let Err(e) = tracker.track(Handle::stream_url(url.as_str())) {
            warn!(stream_url = %url, error = %e, "Skipping stream");
        }
    }

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            server::shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let runner = tokio::spawn({
        let tracker = tracker.clone();
        let shutdown = shutdown.clone();
        async move { tracker.run(shutdown).await }
    });

    let address = args.address.unwrap_or(config.server.bind_addr);
    let served = server::run(address, tracker, shutdown.clone()).await;

    // Stop the tracker even if the server failed to start.
    shutdown.cancel();
    runner.await?;

    served
}

fn print_config(args: ConfigArgs) -> Result<(), AnyError> {
    let config = load_config(args.config)?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
