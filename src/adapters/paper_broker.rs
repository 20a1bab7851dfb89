//! Broker connection built from `[broker]` credentials.
//!
//! Order routing lives behind the broker's own API; this adapter only holds the
//! connection settings and attaches strategies to the session.

use crate::domain::error::AlgotraderError;
use crate::domain::run::LiveStrategy;
use crate::ports::broker_port::BrokerPort;
use crate::ports::config_port::ConfigPort;
use std::fmt;
use tracing::info;

pub const DEFAULT_PAPER_URL: &str = "https://paper-api.alpaca.markets";
pub const DEFAULT_LIVE_URL: &str = "https://api.alpaca.markets";

#[derive(Clone, PartialEq)]
pub struct BrokerCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub paper: bool,
}

impl BrokerCredentials {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AlgotraderError> {
        let required = |key: &str| {
            config
                .get_string("broker", key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AlgotraderError::ConfigMissing {
                    section: "broker".into(),
                    key: key.into(),
                })
        };
        let api_key = required("api_key")?;
        let api_secret = required("api_secret")?;
        let paper = config.get_bool("broker", "paper", true);
        let base_url = config.get_string("broker", "base_url").unwrap_or_else(|| {
            if paper { DEFAULT_PAPER_URL } else { DEFAULT_LIVE_URL }.to_string()
        });

        Ok(Self {
            api_key,
            api_secret,
            base_url,
            paper,
        })
    }
}

impl fmt::Debug for BrokerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("paper", &self.paper)
            .finish()
    }
}

#[derive(Debug)]
pub struct PaperBroker {
    credentials: BrokerCredentials,
    name: String,
}

impl PaperBroker {
    pub fn new(credentials: BrokerCredentials) -> Result<Self, AlgotraderError> {
        if !credentials.base_url.starts_with("http://")
            && !credentials.base_url.starts_with("https://")
        {
            return Err(AlgotraderError::Broker {
                reason: format!("invalid broker url '{}'", credentials.base_url),
            });
        }
        let name = if credentials.paper { "alpaca-paper" } else { "alpaca" }.to_string();
        Ok(Self { credentials, name })
    }

    pub fn base_url(&self) -> &str {
        &self.credentials.base_url
    }
}

impl BrokerPort for PaperBroker {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_paper(&self) -> bool {
        self.credentials.paper
    }

    fn start_session(&self, strategy: &LiveStrategy) -> Result<(), AlgotraderError> {
        info!(
            broker = %self.name,
            url = %self.credentials.base_url,
            strategy = strategy.name(),
            budget = strategy.run.budget,
            "strategy attached to broker session"
        );
        Ok(())
    }
}
