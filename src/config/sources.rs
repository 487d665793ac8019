use super::models::Config;
use config::{ConfigError, Environment, File, Map};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "STREAMWATCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/streamwatch.toml";
const ENV_PREFIX: &str = "STREAMWATCH";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    load_from_sources_with_env(config_path, None)
}

/// Same as [`load_from_sources`], reading overrides from `env` instead of the
/// process environment when given
pub fn load_from_sources_with_env(
    config_path: PathBuf,
    env: Option<Map<String, String>>,
) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // STREAMWATCH__SESSION__INTERVAL -> session.interval
    // STREAMWATCH__STREAMS=a,b -> streams
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .list_separator(",")
            .with_list_parse_key("streams")
            .try_parsing(true)
            .source(env),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::HumanDuration;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources_with_env(config_path, env_vars(&[])).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.session.interval, HumanDuration::from_secs(30));
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
streams = [
    "https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8",
    "inv@lid",
]

[server]
bind_addr = "0.0.0.0:9000"

[http]
connect_timeout = "2s"
user_agent = "test-agent/1.0"
max_redirects = 3

[session]
interval = "15s"
single_pass_timeout = "10s"
paused = true
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources_with_env(config_path, env_vars(&[])).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:9000");
        assert_eq!(config.http.connect_timeout, HumanDuration::from_secs(2));
        assert_eq!(config.http.request_timeout, HumanDuration::from_secs(30));
        assert_eq!(config.http.user_agent, "test-agent/1.0");
        assert_eq!(config.http.max_redirects, 3);
        assert_eq!(config.session.interval, HumanDuration::from_secs(15));
        assert_eq!(config.session.single_pass_timeout, HumanDuration::from_secs(10));
        assert!(config.session.paused);
        assert!(!config.session.pause_idle);
        assert_eq!(config.streams.len(), 2);
    }

    fn env_vars(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_env_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources_with_env(
            config_path,
            env_vars(&[
                ("STREAMWATCH__STREAMS", "https://a/live.m3u8,https://b/live.m3u8"),
                ("STREAMWATCH__SESSION__INTERVAL", "10s"),
                ("STREAMWATCH__SESSION__SINGLE_PASS_TIMEOUT", "2500"),
                ("STREAMWATCH__SERVER__BIND_ADDR", "0.0.0.0:9000"),
                ("OTHER__SESSION__INTERVAL", "1h"),
            ]),
        )
        .unwrap();

        assert_eq!(
            config.streams,
            vec!["https://a/live.m3u8", "https://b/live.m3u8"]
        );
        assert_eq!(config.session.interval, HumanDuration::from_secs(10));
        assert_eq!(config.session.single_pass_timeout, HumanDuration::from_millis(2500));
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn test_env_takes_priority_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
streams = ["https://file/live.m3u8"]

[http]
user_agent = "from-file/1.0"
max_redirects = 3

[session]
interval = "1m"
paused = true
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources_with_env(
            config_path,
            env_vars(&[
                ("STREAMWATCH__HTTP__USER_AGENT", "from-env/2.0"),
                ("STREAMWATCH__SESSION__INTERVAL", "5s"),
                ("STREAMWATCH__SESSION__PAUSED", "false"),
            ]),
        )
        .unwrap();

        assert_eq!(config.http.user_agent, "from-env/2.0");
        assert_eq!(config.session.interval, HumanDuration::from_secs(5));
        assert!(!config.session.paused);
        // Keys absent from the environment still come from the file
        assert_eq!(config.http.max_redirects, 3);
        assert_eq!(config.streams, vec!["https://file/live.m3u8"]);
    }

    #[test]
    fn test_env_single_stream() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources_with_env(
            config_path,
            env_vars(&[("STREAMWATCH__STREAMS", "https://only/live.m3u8")]),
        )
        .unwrap();

        assert_eq!(config.streams, vec!["https://only/live.m3u8"]);
    }

    #[test]
    fn test_malformed_duration_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[session]\ninterval = \"soon\"\n").unwrap();

        assert!(load_from_sources_with_env(config_path, env_vars(&[])).is_err());
    }
}
