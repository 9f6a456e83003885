//! # Client Configuration
//!
//! Endpoint, contract addresses and polling parameters for a networked
//! client, loaded from YAML. There are no built-in per-network address
//! tables; every deployment is configured explicitly.
//!
//! ```yaml
//! rpc_url: https://sepolia.example.org
//! eas_address: "0xC2679fBD37d54388Ce493F1DB75320D236e1815e"
//! registry_address: "0x0a7E2Ff54e76B8E6659aedc9103FB21c038050D0"
//! sender: "0x1111111111111111111111111111111111111111"
//! ```

use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for a networked EAS client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// JSON-RPC endpoint (http or https).
    pub rpc_url: String,
    /// Address of the `EAS` contract.
    pub eas_address: Address,
    /// Address of the `SchemaRegistry` contract.
    pub registry_address: Address,
    /// Account transactions are sent from. Signing is done by the node.
    pub sender: Address,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Receipt polls before a submitted transaction times out.
    #[serde(default = "default_receipt_poll_attempts")]
    pub receipt_poll_attempts: u32,
    /// Delay between receipt polls, milliseconds.
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
    /// Retries on connection failure, after the first attempt.
    #[serde(default = "default_rpc_retries")]
    pub rpc_retries: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_receipt_poll_attempts() -> u32 {
    60
}

fn default_receipt_poll_interval_ms() -> u64 {
    1_000
}

fn default_rpc_retries() -> u32 {
    3
}

impl ClientConfig {
    /// A configuration with default timeouts and polling.
    pub fn new(
        rpc_url: impl Into<String>,
        eas_address: Address,
        registry_address: Address,
        sender: Address,
    ) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            eas_address,
            registry_address,
            sender,
            timeout_secs: default_timeout_secs(),
            receipt_poll_attempts: default_receipt_poll_attempts(),
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
            rpc_retries: default_rpc_retries(),
        }
    }

    /// Set receipt polling.
    pub fn with_polling(mut self, attempts: u32, interval_ms: u64) -> Self {
        self.receipt_poll_attempts = attempts;
        self.receipt_poll_interval_ms = interval_ms;
        self
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Check the endpoint, addresses and polling parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.rpc_url)
            .map_err(|e| ConfigError::Invalid(format!("rpc_url {:?}: {e}", self.rpc_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "rpc_url must be http or https, got {}",
                url.scheme()
            )));
        }
        for (name, address) in [
            ("eas_address", self.eas_address),
            ("registry_address", self.registry_address),
        ] {
            if address == Address::ZERO {
                return Err(ConfigError::Invalid(format!("{name} must not be zero")));
            }
        }
        if self.receipt_poll_attempts == 0 {
            return Err(ConfigError::Invalid(
                "receipt_poll_attempts must be at least 1".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The YAML did not match the configuration shape.
    #[error("invalid configuration YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
