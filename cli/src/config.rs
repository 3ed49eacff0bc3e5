//! `movecodec.yaml`: chain, endpoint, local ABI directory and logging.
//!
//! ```yaml
//! chain: sui
//! endpoint: https://fullnode.mainnet.sui.io:443
//! request_timeout_secs: 20
//! abi_dir: ./abis
//! log:
//!   level: info
//!   components:
//!     movecodec-registry: debug
//! ```

use anyhow::{Context, Result};
use movecodec_aptos::{AptosChainAdapter, AptosRestClient, AptosRestFetcher};
use movecodec_core::{ChainAdapter, ModuleFetcher};
use movecodec_observability::LogConfig;
use movecodec_registry::AbiDirectory;
use movecodec_sui::{SuiChainAdapter, SuiRpcFetcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    #[default]
    Aptos,
    Sui,
}

impl Chain {
    pub fn adapter(self) -> Arc<dyn ChainAdapter> {
        match self {
            Chain::Aptos => Arc::new(AptosChainAdapter),
            Chain::Sui => Arc::new(SuiChainAdapter),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCodecConfig {
    #[serde(default)]
    pub chain: Chain,
    /// Fullnode REST (Aptos) or JSON-RPC (Sui) URL; unset means offline.
    #[serde(default = "default_endpoint")]
    pub endpoint: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Local ABI files, one `<account>.json` per account.
    #[serde(default = "default_abi_dir")]
    pub abi_dir: PathBuf,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_endpoint() -> Option<String> {
    None
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_abi_dir() -> PathBuf {
    PathBuf::from("./abis")
}

impl Default for MoveCodecConfig {
    fn default() -> Self {
        Self {
            chain: Chain::default(),
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            abi_dir: default_abi_dir(),
            log: LogConfig::default(),
        }
    }
}

impl MoveCodecConfig {
    /// YAML, or JSON when the file ends in `.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let config = if path.extension().map_or(false, |ext| ext == "json") {
            serde_json::from_str(&body).context("parse JSON config")?
        } else {
            serde_yaml::from_str(&body).context("parse YAML config")?
        };
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Remote fetcher when an endpoint is configured, else the ABI directory.
    pub fn fetcher(&self) -> Result<Arc<dyn ModuleFetcher>> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(Arc::new(AbiDirectory::new(&self.abi_dir)));
        };
        Ok(match self.chain {
            Chain::Aptos => {
                let rest = AptosRestClient::new(endpoint)?.with_timeout(self.request_timeout())?;
                Arc::new(AptosRestFetcher::from_client(rest))
            }
            Chain::Sui => Arc::new(SuiRpcFetcher::with_timeout(
                endpoint.as_str(),
                self.request_timeout(),
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: MoveCodecConfig = serde_yaml::from_str("chain: sui\n").unwrap();
        assert_eq!(config.chain, Chain::Sui);
        assert_eq!(config.endpoint, None);
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.abi_dir, PathBuf::from("./abis"));
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn json_config() {
        let config: MoveCodecConfig = serde_json::from_str(
            r#"{"endpoint": "https://fullnode.mainnet.aptoslabs.com/v1", "log": {"level": "debug"}}"#,
        )
        .unwrap();
        assert_eq!(config.chain, Chain::Aptos);
        assert_eq!(config.log.level, "debug");
        assert!(config.fetcher().is_ok());
    }

    #[test]
    fn unknown_chain_rejected() {
        assert!(serde_yaml::from_str::<MoveCodecConfig>("chain: solana\n").is_err());
    }
}
