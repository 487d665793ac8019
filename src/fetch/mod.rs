//! Fetch capability consumed by the availability checker
//!
//! The checker only needs one operation: issue a request and get back a
//! status code plus a readable body. [`HttpFetcher`] provides it over
//! reqwest; tests and embedders can supply their own [`Fetcher`].

pub mod http;

pub use http::{HttpConfig, HttpFetcher};
pub use reqwest::Method;
pub use reqwest::header::HeaderMap;

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

use crate::context::{CheckContext, ContextError};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error(transparent)]
    Context(#[from] ContextError),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Response body. Dropping it releases the underlying connection.
pub type BodyReader = Pin<Box<dyn AsyncRead + Send>>;

pub struct FetchResponse {
    pub status: u16,
    pub body: BodyReader,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl AsyncRead + Send + 'static) -> Self {
        Self {
            status,
            body: Box::pin(body),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

impl fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Issues a single request
///
/// Implementations must give up promptly once `ctx` is done, returning
/// [`FetchError::Context`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn request(
        &self,
        ctx: &CheckContext,
        method: Method,
        url: &str,
        headers: Option<HeaderMap>,
        body: Option<Bytes>,
    ) -> Result<FetchResponse>;
}
