/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed feed runner settings and the derived client configuration
[POS]:    Configuration layer - runner setup
[UPDATE]: When adding new configuration options
*/

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

use predictit_adapter::{ContractFilter, FeedConfig, QueueMode};

/// Top-level configuration for the feed runner
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedSettings {
    /// File holding `username password`
    pub auth_file: PathBuf,
    /// Contract whose order book is subscribed, if any
    #[serde(default)]
    pub contract_id: Option<String>,
    /// Contracts whose stats are delivered; empty delivers every contract
    #[serde(default)]
    pub stats_contracts: Vec<String>,
    /// Bound the dispatch queue; unbounded when absent
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
    /// Endpoint overrides
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

/// Optional endpoint overrides, mostly useful against a local stand-in
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub http_base_url: Option<String>,
    #[serde(default)]
    pub trade_feed_url: Option<String>,
    #[serde(default)]
    pub status_feed_url: Option<String>,
}

fn default_keepalive_secs() -> u64 {
    300
}

impl FeedSettings {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("read config file {path}"))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let settings: Self = serde_yaml::from_str(content).context("parse yaml config")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.keepalive_secs > 0, "keepalive_secs must be positive");
        ensure!(
            self.queue_capacity != Some(0),
            "queue_capacity must be positive when set"
        );
        if let Some(contract_id) = &self.contract_id {
            ensure!(!contract_id.trim().is_empty(), "contract_id must not be blank");
        }
        Ok(())
    }

    pub fn feed_config(&self) -> FeedConfig {
        let mut config = FeedConfig {
            keepalive_interval: Duration::from_secs(self.keepalive_secs),
            queue: self
                .queue_capacity
                .map_or(QueueMode::Unbounded, QueueMode::Bounded),
            ..FeedConfig::default()
        };
        if let Some(url) = &self.endpoints.trade_feed_url {
            config.trade_feed_url = url.clone();
        }
        if let Some(url) = &self.endpoints.status_feed_url {
            config.status_feed_url = url.clone();
        }
        config
    }

    /// Stats filter built from the allow-list; `None` when every contract passes
    pub fn stats_filter(&self) -> Option<ContractFilter> {
        if self.stats_contracts.is_empty() {
            return None;
        }
        let allowed: HashSet<String> = self.stats_contracts.iter().cloned().collect();
        Some(Arc::new(move |contract_id: &str| !allowed.contains(contract_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "auth_file: auth.txt\n";

    #[test]
    fn test_minimal_config_uses_defaults() {
        let settings = FeedSettings::parse(MINIMAL).unwrap();
        assert_eq!(settings.auth_file, PathBuf::from("auth.txt"));
        assert_eq!(settings.contract_id, None);
        assert_eq!(settings.keepalive_secs, 300);
        assert!(settings.stats_filter().is_none());

        let config = settings.feed_config();
        assert_eq!(config.queue, QueueMode::Unbounded);
        assert_eq!(config.keepalive_interval, Duration::from_secs(300));
        assert_eq!(config.trade_feed_url, FeedConfig::default().trade_feed_url);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
auth_file: /etc/predictit/auth.txt
contract_id: "12345"
stats_contracts: ["12345", "4711"]
queue_capacity: 1024
keepalive_secs: 60
endpoints:
  trade_feed_url: ws://127.0.0.1:9000/.ws
"#;
        let settings = FeedSettings::parse(yaml).unwrap();
        let config = settings.feed_config();
        assert_eq!(config.queue, QueueMode::Bounded(1024));
        assert_eq!(config.keepalive_interval, Duration::from_secs(60));
        assert_eq!(config.trade_feed_url, "ws://127.0.0.1:9000/.ws");
        assert_eq!(config.status_feed_url, FeedConfig::default().status_feed_url);

        let filter = settings.stats_filter().expect("allow-list filter");
        assert!(!filter("12345"));
        assert!(!filter("4711"));
        assert!(filter("1"));
    }

    #[test]
    fn test_rejects_zero_keepalive() {
        let err = FeedSettings::parse("auth_file: a\nkeepalive_secs: 0\n").unwrap_err();
        assert!(format!("{err:#}").contains("keepalive_secs"));
    }

    #[test]
    fn test_rejects_zero_queue_capacity() {
        assert!(FeedSettings::parse("auth_file: a\nqueue_capacity: 0\n").is_err());
    }

    #[test]
    fn test_missing_auth_file_is_error() {
        assert!(FeedSettings::parse("contract_id: \"1\"\n").is_err());
    }
}
