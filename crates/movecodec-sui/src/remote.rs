//! Sui JSON-RPC module fetching.
//!
//! Requires the `remote` feature.
//!
//! ```toml
//! movecodec-sui = { version = "0.1", features = ["remote"] }
//! ```

use async_trait::async_trait;
use movecodec_core::{FetchError, ModuleFetcher, RawModule};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

pub const MAINNET_ENDPOINT: &str = "https://fullnode.mainnet.sui.io:443";
pub const TESTNET_ENDPOINT: &str = "https://fullnode.testnet.sui.io:443";

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Empty result for {method}")]
    EmptyResult { method: String },

    #[error("Rate limited by {endpoint}")]
    RateLimited { endpoint: String },
}

impl RemoteError {
    fn into_fetch_error(self, account: &str) -> FetchError {
        match self {
            Self::Rpc { message, .. } | Self::EmptyResult { method: message } => {
                FetchError::InvalidResponse {
                    account: account.to_string(),
                    reason: message,
                }
            }
            other => FetchError::Transport {
                account: account.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// `ModuleFetcher` over `sui_getNormalizedMoveModule*`.
#[derive(Debug)]
pub struct SuiRpcFetcher {
    client: Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl SuiRpcFetcher {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RemoteError> {
        Self::with_timeout(endpoint, Duration::from_secs(15))
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("movecodec/0.1 (https://github.com/DarshanKumar89/chainfoundry)")
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn mainnet() -> Result<Self, RemoteError> {
        Self::new(MAINNET_ENDPOINT)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Single JSON-RPC call; the `result` member on success.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RemoteError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, endpoint = %self.endpoint, "sui rpc");
        let resp = self.client.post(&self.endpoint).json(&request).send().await?;
        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(RemoteError::RateLimited {
                endpoint: self.endpoint.clone(),
            });
        }
        let body: JsonRpcResponse = resp.error_for_status()?.json().await?;
        if let Some(err) = body.error {
            return Err(RemoteError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        body.result
            .filter(|r| !r.is_null())
            .ok_or_else(|| RemoteError::EmptyResult {
                method: method.to_string(),
            })
    }
}

#[async_trait]
impl ModuleFetcher for SuiRpcFetcher {
    async fn fetch_modules(&self, account: &str) -> Result<Vec<RawModule>, FetchError> {
        let result = self
            .call("sui_getNormalizedMoveModulesByPackage", vec![Value::from(account)])
            .await
            .map_err(|e| e.into_fetch_error(account))?;
        match result {
            Value::Object(modules) if !modules.is_empty() => Ok(modules.into_iter().map(|(_, m)| m).collect()),
            Value::Object(_) => Err(FetchError::NotFound {
                account: account.to_string(),
            }),
            other => Err(FetchError::InvalidResponse {
                account: account.to_string(),
                reason: format!("expected module map, got {other}"),
            }),
        }
    }

    async fn fetch_module(&self, account: &str, module: &str) -> Result<RawModule, FetchError> {
        self.call(
            "sui_getNormalizedMoveModule",
            vec![Value::from(account), Value::from(module)],
        )
        .await
        .map_err(|e| match e {
            RemoteError::EmptyResult { .. } => FetchError::ModuleNotFound {
                account: account.to_string(),
                module: module.to_string(),
            },
            other => other.into_fetch_error(account),
        })
    }
}
