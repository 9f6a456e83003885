//! Connection options shared by the on-chain subcommands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use eas_client::{ClientConfig, Eas, JsonRpcTransport, SchemaRegistry};

/// Where to find the node and contracts.
#[derive(Debug, Clone, Default)]
pub struct NetworkOpts {
    /// YAML client configuration.
    pub config: Option<PathBuf>,
    /// Overrides `rpc_url` from the configuration.
    pub rpc_url: Option<String>,
}

/// Facades over one shared JSON-RPC transport.
pub struct Clients {
    /// Schema registry facade.
    pub registry: SchemaRegistry<Arc<JsonRpcTransport>>,
    /// Attestation facade.
    pub eas: Eas<Arc<JsonRpcTransport>>,
}

impl NetworkOpts {
    /// Load the configuration and apply overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        let path = self
            .config
            .as_ref()
            .context("this subcommand talks to a node: pass --config <FILE>")?;
        let mut config = ClientConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
            config.validate().context("--rpc-url")?;
        }
        tracing::debug!(rpc_url = %config.rpc_url, eas = %config.eas_address, "client configuration loaded");
        Ok(config)
    }

    /// Connect both facades.
    pub fn connect(&self) -> Result<Clients> {
        let config = self.load()?;
        let (registry, eas) = (config.registry_address, config.eas_address);
        let transport = Arc::new(JsonRpcTransport::new(config).context("connecting to node")?);
        Ok(Clients {
            registry: SchemaRegistry::new(transport.clone(), registry),
            eas: Eas::new(transport, eas),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
rpc_url: http://127.0.0.1:8545
eas_address: "0x00000000000000000000000000000000000000ea"
registry_address: "0x00000000000000000000000000000000000000ee"
sender: "0x0000000000000000000000000000000000000001"
"#;

    fn write_config(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("eas.yaml");
        std::fs::write(&path, YAML).unwrap();
        path
    }

    #[test]
    fn load_without_config_explains_what_is_missing() {
        let err = NetworkOpts::default().load().unwrap_err();
        assert!(err.to_string().contains("--config"), "{err}");
    }

    #[test]
    fn rpc_url_override_applies() {
        let dir = tempfile::tempdir().unwrap();
        let opts = NetworkOpts {
            config: Some(write_config(&dir)),
            rpc_url: Some("https://node.example.org".into()),
        };
        let config = opts.load().unwrap();
        assert_eq!(config.rpc_url, "https://node.example.org");
    }

    #[test]
    fn invalid_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let opts = NetworkOpts {
            config: Some(write_config(&dir)),
            rpc_url: Some("ftp://node".into()),
        };
        assert!(opts.load().is_err());
    }

    #[test]
    fn connect_binds_configured_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let opts = NetworkOpts {
            config: Some(write_config(&dir)),
            rpc_url: None,
        };
        let clients = opts.connect().unwrap();
        assert_eq!(clients.eas.address(), alloy_primitives::Address::with_last_byte(0xea));
        assert_eq!(
            clients.registry.address(),
            alloy_primitives::Address::with_last_byte(0xee)
        );
    }
}
