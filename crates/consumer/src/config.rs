//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use analytics_store::DatabaseConfig;

use crate::{ConsumerError, Result};

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConsumerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConsumerError::Config(format!("unknown LOG_FORMAT {other:?}"))),
        }
    }
}

/// Kafka consumer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaConfig {
    pub bootstrap_servers: String,
    pub client_id: Option<String>,
    pub group_id: String,
    pub auto_offset_reset: String,
    pub auto_commit_interval_ms: u64,
    pub session_timeout_ms: u64,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            client_id: None,
            group_id: "analytics-projection-service".to_string(),
            auto_offset_reset: "earliest".to_string(),
            auto_commit_interval_ms: 5000,
            session_timeout_ms: 6000,
        }
    }
}

/// Consumer configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `DATABASE_URL` — Postgres connection string (required)
/// - `DB_POOL_SIZE` — maximum pool connections (default: `5`)
/// - `DB_ACQUIRE_TIMEOUT_SECS` — pool acquire timeout (default: `10`)
/// - `KAFKA_BOOTSTRAP_SERVERS` — broker list (default: `"localhost:9092"`)
/// - `KAFKA_CLIENT_ID` — client id reported to the broker (optional)
/// - `KAFKA_GROUP_ID` — consumer group (default: `"analytics-projection-service"`)
/// - `KAFKA_AUTO_OFFSET_RESET` — start position without a committed offset (default: `"earliest"`)
/// - `KAFKA_AUTO_COMMIT_INTERVAL_MS` — offset commit interval (default: `5000`)
/// - `KAFKA_SESSION_TIMEOUT_MS` — group session timeout (default: `6000`)
/// - `POLL_TIMEOUT_MS` — poll wait per iteration (default: `1000`)
/// - `OPS_HOST` / `OPS_PORT` — health and metrics listener (default: `"0.0.0.0:9100"`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` — `text` or `json` (default: `text`)
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub kafka: KafkaConfig,
    pub poll_timeout: Duration,
    pub ops_host: String,
    pub ops_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let url = parse("DATABASE_URL")
            .ok_or_else(|| ConsumerError::Config("DATABASE_URL must be set".to_string()))?;

        let database = DatabaseConfig {
            url,
            max_connections: parse_or(parse("DB_POOL_SIZE"), defaults.database.max_connections),
            acquire_timeout: parse("DB_ACQUIRE_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.database.acquire_timeout),
        };

        let kafka = KafkaConfig {
            bootstrap_servers: parse("KAFKA_BOOTSTRAP_SERVERS")
                .unwrap_or(defaults.kafka.bootstrap_servers),
            client_id: parse("KAFKA_CLIENT_ID"),
            group_id: parse("KAFKA_GROUP_ID").unwrap_or(defaults.kafka.group_id),
            auto_offset_reset: parse("KAFKA_AUTO_OFFSET_RESET")
                .unwrap_or(defaults.kafka.auto_offset_reset),
            auto_commit_interval_ms: parse_or(
                parse("KAFKA_AUTO_COMMIT_INTERVAL_MS"),
                defaults.kafka.auto_commit_interval_ms,
            ),
            session_timeout_ms: parse_or(
                parse("KAFKA_SESSION_TIMEOUT_MS"),
                defaults.kafka.session_timeout_ms,
            ),
        };

        let log_format = match parse("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            database,
            kafka,
            poll_timeout: parse("POLL_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_timeout),
            ops_host: parse("OPS_HOST").unwrap_or(defaults.ops_host),
            ops_port: parse_or(parse("OPS_PORT"), defaults.ops_port),
            log_level: parse("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
        })
    }

    /// Returns the `"host:port"` bind address of the ops listener.
    pub fn ops_addr(&self) -> String {
        format!("{}:{}", self.ops_host, self.ops_port)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            kafka: KafkaConfig::default(),
            poll_timeout: Duration::from_millis(1000),
            ops_host: "0.0.0.0".to_string(),
            ops_port: 9100,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/analytics")]).unwrap();
        assert_eq!(config.database.url, "postgres://localhost/analytics");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.acquire_timeout, Duration::from_secs(10));
        assert_eq!(config.kafka, KafkaConfig::default());
        assert_eq!(config.poll_timeout, Duration::from_secs(1));
        assert_eq!(config.ops_addr(), "0.0.0.0:9100");
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/analytics"),
            ("DB_POOL_SIZE", "12"),
            ("KAFKA_BOOTSTRAP_SERVERS", "kafka-1:9092,kafka-2:9092"),
            ("KAFKA_CLIENT_ID", "analytics-1"),
            ("KAFKA_GROUP_ID", "replay"),
            ("KAFKA_AUTO_OFFSET_RESET", "latest"),
            ("POLL_TIMEOUT_MS", "250"),
            ("OPS_PORT", "8081"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.database.max_connections, 12);
        assert_eq!(config.kafka.bootstrap_servers, "kafka-1:9092,kafka-2:9092");
        assert_eq!(config.kafka.client_id.as_deref(), Some("analytics-1"));
        assert_eq!(config.kafka.group_id, "replay");
        assert_eq!(config.kafka.auto_offset_reset, "latest");
        assert_eq!(config.poll_timeout, Duration::from_millis(250));
        assert_eq!(config.ops_port, 8081);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/analytics"),
            ("DB_POOL_SIZE", "many"),
            ("OPS_PORT", "-1"),
        ])
        .unwrap();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.ops_port, 9100);
    }

    #[test]
    fn test_missing_database_url() {
        assert!(matches!(load(&[]), Err(ConsumerError::Config(_))));
        assert!(matches!(
            load(&[("DATABASE_URL", "  ")]),
            Err(ConsumerError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_log_format() {
        let result = load(&[("DATABASE_URL", "postgres://db"), ("LOG_FORMAT", "xml")]);
        assert!(matches!(result, Err(ConsumerError::Config(_))));
    }
}
