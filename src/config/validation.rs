use super::models::Config;
use thiserror::Error;
use url::Url;

const MAX_REDIRECTS: usize = 20;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: String },

    #[error("HTTP user agent must not be empty")]
    EmptyUserAgent,

    #[error("max_redirects ({actual}) exceeds limit of {limit}")]
    TooManyRedirects { actual: usize, limit: usize },

    #[error("Invalid proxy URL '{proxy}'")]
    InvalidProxyUrl { proxy: String },

    #[error("Stream entry {index} is empty")]
    EmptyStreamUrl { index: usize },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_session(config)?;
    validate_http(config)?;
    validate_streams(config)?;
    Ok(())
}

fn validate_session(config: &Config) -> Result<(), ValidationError> {
    let durations = [
        ("session.interval", config.session.interval),
        ("session.single_pass_timeout", config.session.single_pass_timeout),
    ];

    for (field, value) in durations {
        if value.is_zero() {
            return Err(ValidationError::ZeroDuration {
                field: field.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    let http = &config.http;

    for (field, value) in [
        ("http.connect_timeout", http.connect_timeout),
        ("http.request_timeout", http.request_timeout),
    ] {
        if value.is_zero() {
            return Err(ValidationError::ZeroDuration {
                field: field.to_string(),
            });
        }
    }

    if http.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }

    if http.max_redirects > MAX_REDIRECTS {
        return Err(ValidationError::TooManyRedirects {
            actual: http.max_redirects,
            limit: MAX_REDIRECTS,
        });
    }

    if let Some(proxy) = &http.proxy {
        if Url::parse(proxy).is_err() {
            return Err(ValidationError::InvalidProxyUrl {
                proxy: proxy.clone(),
            });
        }
    }

    Ok(())
}

/// Entries only need to be non-empty; the checker reports unusable URLs per stream.
fn validate_streams(config: &Config) -> Result<(), ValidationError> {
    match config.streams.iter().position(|stream| stream.trim().is_empty()) {
        Some(index) => Err(ValidationError::EmptyStreamUrl { index }),
        None => Ok(()),
    }
}
