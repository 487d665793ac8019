use crate::fetch::HttpConfig;
use crate::humanize::HumanDuration;
use crate::settings::{CrawlerSettings, SessionSettings};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Stream URLs tracked on startup
    #[serde(default)]
    pub streams: Vec<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpClientConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Status server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8080))
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpClientConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default = "default_use_system_proxy")]
    pub use_system_proxy: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            proxy: None,
            use_system_proxy: default_use_system_proxy(),
        }
    }
}

impl HttpClientConfig {
    pub fn to_http_config(&self) -> HttpConfig {
        HttpConfig {
            connect_timeout: self.connect_timeout.as_duration(),
            request_timeout: self.request_timeout.as_duration(),
            user_agent: self.user_agent.clone(),
            max_redirects: self.max_redirects,
            proxy: self.proxy.clone(),
            use_system_proxy: self.use_system_proxy,
        }
    }
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(30)
}

fn default_user_agent() -> String {
    HttpConfig::default().user_agent
}

fn default_max_redirects() -> usize {
    10
}

fn default_use_system_proxy() -> bool {
    true
}

/// Scheduling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_interval")]
    pub interval: HumanDuration,
    #[serde(default = "default_single_pass_timeout")]
    pub single_pass_timeout: HumanDuration,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub pause_idle: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            single_pass_timeout: default_single_pass_timeout(),
            paused: false,
            pause_idle: false,
        }
    }
}

fn default_interval() -> HumanDuration {
    HumanDuration::from_secs(30)
}

fn default_single_pass_timeout() -> HumanDuration {
    HumanDuration::from_secs(30)
}

impl From<&SessionConfig> for CrawlerSettings {
    fn from(session: &SessionConfig) -> Self {
        CrawlerSettings {
            session: SessionSettings {
                interval: session.interval.as_duration(),
                single_pass_timeout: session.single_pass_timeout.as_duration(),
                paused: session.paused,
                pause_idle: session.pause_idle,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.http.request_timeout, HumanDuration::from_secs(30));
        assert_eq!(config.http.max_redirects, 10);
        assert!(config.streams.is_empty());
    }

    #[test]
    fn test_defaults_match_crawler_settings() {
        let settings = CrawlerSettings::from(&SessionConfig::default());
        assert_eq!(settings, CrawlerSettings::default());
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
streams = ["https://example.com/live.m3u8"]

[http]
request_timeout = "5s"
proxy = "http://proxy:3128"

[session]
interval = "1m"
single_pass_timeout = 2500
pause_idle = true
            "#,
        )
        .unwrap();

        let http = config.http.to_http_config();
        assert_eq!(http.request_timeout, Duration::from_secs(5));
        assert_eq!(http.connect_timeout, Duration::from_secs(10));
        assert_eq!(http.proxy.as_deref(), Some("http://proxy:3128"));

        let settings = CrawlerSettings::from(&config.session);
        assert_eq!(settings.session.interval, Duration::from_secs(60));
        assert_eq!(settings.session.single_pass_timeout, Duration::from_millis(2500));
        assert!(settings.session.pause_idle);
        assert!(!settings.session.paused);
        assert_eq!(config.streams.len(), 1);
    }

    #[test]
    fn test_serialize_round_trips_through_toml() {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(rendered.contains("interval = \"30s\""));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.session.interval, HumanDuration::from_secs(30));
    }
}
