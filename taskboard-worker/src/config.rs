/// Worker configuration
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `DIGEST_POLL_INTERVAL_SECS`: Seconds between scans (default: 30)
/// - `DIGEST_BATCH_SIZE`: Most schedules handled per scan (default: 100)
/// - `MAIL_TRANSPORT`: `log` or `http` (default: log)
/// - `MAIL_FROM`: Sender address (required)
/// - `MAIL_RELAY_URL`, `MAIL_RELAY_API_KEY`: Relay endpoint and key (required for `http`)
/// - `RUST_LOG`: Log filter (default: taskboard_worker=debug)

use crate::digest::DigestConfig;
use std::env;

/// Complete worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Database settings
    pub database: DatabaseSettings,

    /// Scan schedule
    pub digest: DigestConfig,

    /// Outgoing mail
    pub mail: MailConfig,
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum pool size
    pub max_connections: u32,
}

/// Outgoing mail settings
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Sender address of every digest
    pub from: String,

    /// Transport to deliver with
    pub transport: MailTransport,
}

/// Mail transport selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransport {
    /// Log messages instead of sending them
    Log,

    /// POST messages to an HTTP relay
    Http { relay_url: String, api_key: String },
}

impl MailTransport {
    /// Resolves the transport from `MAIL_TRANSPORT` and the relay variables
    pub fn parse(
        kind: &str,
        relay_url: Option<String>,
        api_key: Option<String>,
    ) -> anyhow::Result<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "http" => {
                let relay_url = relay_url
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| anyhow::anyhow!("MAIL_RELAY_URL is required for the http transport"))?;
                let api_key = api_key
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| anyhow::anyhow!("MAIL_RELAY_API_KEY is required for the http transport"))?;

                Ok(Self::Http { relay_url, api_key })
            }
            other => anyhow::bail!("Unknown MAIL_TRANSPORT '{}' (expected log or http)", other),
        }
    }
}

impl WorkerConfig {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value can't be
    /// parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        let defaults = DigestConfig::default();

        let poll_interval_secs = match env::var("DIGEST_POLL_INTERVAL_SECS") {
            Ok(raw) => raw.parse::<u64>()?,
            Err(_) => defaults.poll_interval_secs,
        };
        if poll_interval_secs == 0 {
            anyhow::bail!("DIGEST_POLL_INTERVAL_SECS must be greater than zero");
        }

        let batch_size = match env::var("DIGEST_BATCH_SIZE") {
            Ok(raw) => raw.parse::<i64>()?,
            Err(_) => defaults.batch_size,
        };
        if batch_size <= 0 {
            anyhow::bail!("DIGEST_BATCH_SIZE must be greater than zero");
        }

        let from = env::var("MAIL_FROM")
            .map_err(|_| anyhow::anyhow!("MAIL_FROM environment variable is required"))?;

        let transport = MailTransport::parse(
            &env::var("MAIL_TRANSPORT").unwrap_or_else(|_| "log".to_string()),
            env::var("MAIL_RELAY_URL").ok(),
            env::var("MAIL_RELAY_API_KEY").ok(),
        )?;

        Ok(Self {
            database: DatabaseSettings {
                url,
                max_connections,
            },
            digest: DigestConfig {
                poll_interval_secs,
                batch_size,
            },
            mail: MailConfig { from, transport },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_transport() {
        assert_eq!(MailTransport::parse("log", None, None).unwrap(), MailTransport::Log);
        assert_eq!(MailTransport::parse(" LOG ", None, None).unwrap(), MailTransport::Log);
    }

    #[test]
    fn test_parse_http_transport() {
        let transport = MailTransport::parse(
            "http",
            Some("https://relay.example/send".to_string()),
            Some("secret".to_string()),
        )
        .unwrap();

        assert_eq!(
            transport,
            MailTransport::Http {
                relay_url: "https://relay.example/send".to_string(),
                api_key: "secret".to_string(),
            }
        );
    }

    #[test]
    fn test_http_transport_needs_relay_settings() {
        assert!(MailTransport::parse("http", None, Some("k".to_string())).is_err());
        assert!(MailTransport::parse("http", Some("https://r".to_string()), None).is_err());
        assert!(MailTransport::parse("http", Some(String::new()), Some("k".to_string())).is_err());
    }

    #[test]
    fn test_unknown_transport() {
        let err = MailTransport::parse("smtp", None, None).unwrap_err();
        assert!(err.to_string().contains("smtp"));
    }
}
