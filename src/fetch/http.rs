//! reqwest-backed fetcher

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::{Client, Method, Proxy, header::HeaderMap};
use std::io;
use std::time::Duration;
use tokio_util::io::StreamReader;
use tracing::debug;

use super::{FetchError, FetchResponse, Fetcher, Result};
use crate::context::CheckContext;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
    pub proxy: Option<String>,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` when no explicit proxy is set
    pub use_system_proxy: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("streamwatch/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 10,
            proxy: None,
            use_system_proxy: true,
        }
    }
}

/// Fetcher over a shared reqwest connection pool
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));

        if let Some(url) = &config.proxy {
            let proxy = Proxy::all(url)
                .map_err(|e| FetchError::InvalidUrl(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        } else if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn request(
        &self,
        ctx: &CheckContext,
        method: Method,
        url: &str,
        headers: Option<HeaderMap>,
        body: Option<Bytes>,
    ) -> Result<FetchResponse> {
        debug!(url, %method, "Sending request");

        let mut request = self.client.request(method, url);
        if let Some(headers) = headers {
            request = request.headers(headers);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = ctx.run(request.send()).await?.map_err(map_request_error)?;

        let status = response.status().as_u16();
        debug!(url, status, "Response received");

        let stream = response.bytes_stream().map_err(io::Error::other);
        Ok(FetchResponse::new(status, StreamReader::new(stream)))
    }
}

fn map_request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_redirect() {
        FetchError::TooManyRedirects
    } else if e.is_builder() {
        FetchError::InvalidUrl(e.to_string())
    } else {
        FetchError::RequestFailed(e.to_string())
    }
}
