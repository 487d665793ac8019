//! Fetch-and-classify availability check for one stream URL

use tracing::debug;
use url::Url;

use super::CheckError;
use super::manifest;
use crate::context::CheckContext;
use crate::fetch::{Fetcher, Method};

/// A stream URL must be non-empty and parse as an absolute URL
pub fn is_valid_stream_url(stream_url: &str) -> bool {
    if stream_url.is_empty() {
        return false;
    }

    match Url::parse(stream_url) {
        Ok(url) => !url.scheme().is_empty(),
        Err(_) => false,
    }
}

/// Reports whether the stream at `stream_url` is currently live
///
/// A non-2xx response is a normal "not live" outcome. `ctx` bounds both the
/// request and the body read; `None` means no cancellation at all.
pub async fn check_availability(
    ctx: Option<&CheckContext>,
    fetcher: Option<&dyn Fetcher>,
    stream_url: &str,
) -> Result<bool, CheckError> {
    if !is_valid_stream_url(stream_url) {
        return Err(CheckError::InvalidStreamUrl);
    }

    let fetcher = fetcher.ok_or(CheckError::NoClient)?;

    let ctx = match ctx {
        Some(ctx) => {
            if let Some(err) = ctx.err() {
                return Err(err.into());
            }
            ctx.clone()
        }
        None => CheckContext::background(),
    };

    let mut response = fetcher
        .request(&ctx, Method::GET, stream_url, None, None)
        .await?;

    if !response.is_success() {
        debug!(stream_url, status = response.status, "Stream not fetchable");
        return Ok(false);
    }

    let flags = ctx
        .run(manifest::classify(&mut response.body))
        .await?
        .map_err(CheckError::Classify)?;

    Ok(flags.is_live())
}
