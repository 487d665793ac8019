//! HLS availability detection
//!
//! - [`manifest`] turns manifest text into [`ManifestFlags`] and a live verdict
//! - [`check`] fetches a stream URL and classifies the response

pub mod check;
pub mod manifest;

pub use check::{check_availability, is_valid_stream_url};
pub use manifest::{ManifestFlags, classify};

use thiserror::Error;

use crate::context::ContextError;
use crate::fetch::FetchError;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("invalid stream URL")]
    InvalidStreamUrl,

    #[error("no fetch client configured")]
    NoClient,

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("request failed: {0}")]
    Fetch(#[source] FetchError),

    #[error("decode manifest: {0}")]
    Classify(#[source] std::io::Error),

    /// Reserved for stricter response validation; not produced today.
    #[error("unexpected HLS response")]
    UnexpectedResponse,
}

impl From<FetchError> for CheckError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Context(err) => CheckError::Context(err),
            err => CheckError::Fetch(err),
        }
    }
}
