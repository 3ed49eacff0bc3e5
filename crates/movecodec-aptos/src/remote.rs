//! Aptos fullnode REST access: module ABIs for the registry and account
//! resources for decoding.
//!
//! Requires the `remote` feature.
//!
//! ```toml
//! movecodec-aptos = { version = "0.1", features = ["remote"] }
//! ```

use crate::coder::{AptosCoder, IntoTypeDescriptor};
use async_trait::async_trait;
use movecodec_core::{
    account_address_string, DecodeError, DecodedStruct, FetchError, ModuleFetcher, RawModule,
    TypeParseError,
};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const MAINNET_ENDPOINT: &str = "https://fullnode.mainnet.aptoslabs.com/v1";
pub const TESTNET_ENDPOINT: &str = "https://fullnode.testnet.aptoslabs.com/v1";

/// Page size for module and resource listings.
const PAGE_LIMIT: u32 = 1000;
/// Response header carrying the next page cursor.
const CURSOR_HEADER: &str = "x-aptos-cursor";

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Invalid response for {what}: {reason}")]
    InvalidResponse { what: String, reason: String },

    #[error("Rate limited by {endpoint}")]
    RateLimited { endpoint: String },

    #[error("Invalid account: {0}")]
    InvalidAccount(#[from] TypeParseError),

    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),
}

impl RemoteError {
    fn into_fetch_error(self, account: &str) -> FetchError {
        match self {
            Self::NotFound { .. } => FetchError::NotFound {
                account: account.to_string(),
            },
            Self::InvalidResponse { reason, .. } => FetchError::InvalidResponse {
                account: account.to_string(),
                reason,
            },
            other => FetchError::Transport {
                account: account.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

fn http_client(timeout: Duration) -> Result<Client, RemoteError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent("movecodec/0.1 (https://github.com/DarshanKumar89/chainfoundry)")
        .build()?)
}

/// Thin fullnode client shared by the module fetcher and resource client.
#[derive(Debug, Clone)]
pub struct AptosRestClient {
    client: Client,
    endpoint: Url,
}

impl AptosRestClient {
    pub fn new(endpoint: &str) -> Result<Self, RemoteError> {
        let endpoint = Url::parse(endpoint).map_err(|e| RemoteError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client: http_client(Duration::from_secs(15))?,
            endpoint,
        })
    }

    /// Rebuild the HTTP client with a different request timeout.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, RemoteError> {
        Ok(self.with_client(http_client(timeout)?))
    }

    pub fn mainnet() -> Result<Self, RemoteError> {
        Self::new(MAINNET_ENDPOINT)
    }

    /// Replace the HTTP client (custom timeouts, proxies).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidEndpoint {
                endpoint: self.endpoint.to_string(),
                reason: "cannot be a base URL".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url, what: &str) -> Result<(Value, Option<String>), RemoteError> {
        debug!(%url, "aptos GET");
        let resp = self.client.get(url.clone()).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => {
                return Err(RemoteError::NotFound {
                    what: what.to_string(),
                })
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(RemoteError::RateLimited {
                    endpoint: self.endpoint.to_string(),
                })
            }
            _ => {}
        }
        let resp = resp.error_for_status()?;
        let cursor = resp
            .headers()
            .get(CURSOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.json::<Value>().await?;
        Ok((body, cursor))
    }

    /// Follow `x-aptos-cursor` until the listing is exhausted.
    async fn get_paged(&self, segments: &[&str], what: &str) -> Result<Vec<Value>, RemoteError> {
        let mut out = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut url = self.url(segments)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("limit", &PAGE_LIMIT.to_string());
                if let Some(start) = &cursor {
                    query.append_pair("start", start);
                }
            }
            let (body, next) = self.get(url, what).await?;
            match body {
                Value::Array(items) => out.extend(items),
                other => {
                    return Err(RemoteError::InvalidResponse {
                        what: what.to_string(),
                        reason: format!("expected array, got {other}"),
                    })
                }
            }
            match next {
                Some(next) => cursor = Some(next),
                None => return Ok(out),
            }
        }
    }

    pub async fn account_modules(&self, account: &str) -> Result<Vec<RawModule>, RemoteError> {
        let addr = account_address_string(account)?;
        self.get_paged(&["accounts", &addr, "modules"], &format!("modules of {addr}"))
            .await
    }

    pub async fn account_module(&self, account: &str, module: &str) -> Result<RawModule, RemoteError> {
        let addr = account_address_string(account)?;
        let url = self.url(&["accounts", &addr, "module", module])?;
        Ok(self.get(url, &format!("module {addr}::{module}")).await?.0)
    }

    pub async fn account_resources(&self, account: &str) -> Result<Vec<Value>, RemoteError> {
        let addr = account_address_string(account)?;
        self.get_paged(&["accounts", &addr, "resources"], &format!("resources of {addr}"))
            .await
    }

    /// Single resource by full type signature. `None` when the account
    /// does not hold it.
    pub async fn account_resource(
        &self,
        account: &str,
        resource_type: &str,
    ) -> Result<Option<Value>, RemoteError> {
        let addr = account_address_string(account)?;
        let url = self.url(&["accounts", &addr, "resource", resource_type])?;
        match self.get(url, &format!("resource {resource_type}")).await {
            Ok((body, _)) => Ok(Some(body)),
            Err(RemoteError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// `ModuleFetcher` over the fullnode REST API.
#[derive(Debug, Clone)]
pub struct AptosRestFetcher {
    rest: AptosRestClient,
}

impl AptosRestFetcher {
    pub fn new(endpoint: &str) -> Result<Self, RemoteError> {
        Ok(Self {
            rest: AptosRestClient::new(endpoint)?,
        })
    }

    pub fn from_client(rest: AptosRestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl ModuleFetcher for AptosRestFetcher {
    async fn fetch_modules(&self, account: &str) -> Result<Vec<RawModule>, FetchError> {
        self.rest
            .account_modules(account)
            .await
            .map_err(|e| e.into_fetch_error(account))
    }

    async fn fetch_module(&self, account: &str, module: &str) -> Result<RawModule, FetchError> {
        self.rest
            .account_module(account, module)
            .await
            .map_err(|e| match e {
                RemoteError::NotFound { .. } => FetchError::ModuleNotFound {
                    account: account.to_string(),
                    module: module.to_string(),
                },
                other => other.into_fetch_error(account),
            })
    }
}

/// Reads and decodes resources held by an account.
#[derive(Debug, Clone)]
pub struct AccountResourceClient {
    rest: AptosRestClient,
    coder: AptosCoder,
}

impl AccountResourceClient {
    pub fn new(rest: AptosRestClient, coder: AptosCoder) -> Self {
        Self { rest, coder }
    }

    /// Client whose coder loads modules from the same fullnode.
    pub fn for_endpoint(endpoint: &str) -> Result<Self, RemoteError> {
        let rest = AptosRestClient::new(endpoint)?;
        let coder = AptosCoder::new(std::sync::Arc::new(AptosRestFetcher::from_client(rest.clone())));
        Ok(Self { rest, coder })
    }

    pub fn coder(&self) -> &AptosCoder {
        &self.coder
    }

    /// Every resource on the account, undecoded.
    pub async fn get_all(&self, account: &str) -> Result<Vec<Value>, RemoteError> {
        self.rest.account_resources(account).await
    }

    /// The resource of exactly `resource_type`, decoded. The type must be
    /// fully concrete.
    pub async fn match_exact(
        &self,
        account: &str,
        resource_type: impl IntoTypeDescriptor,
    ) -> Result<Option<DecodedStruct>, RemoteError> {
        let ty = resource_type.into_type()?;
        if ty.exist_any_type() {
            return Err(DecodeError::AmbiguousType(ty.signature()).into());
        }
        let signature = ty.signature();
        let Some(body) = self.rest.account_resource(account, &signature).await? else {
            return Ok(None);
        };
        let resource = match body.get("type") {
            Some(_) => body,
            None => serde_json::json!({"type": signature, "data": body}),
        };
        Ok(Some(self.coder.decode_resource(&resource).await?))
    }

    /// Every resource matching `pattern`, decoded. A pattern without type
    /// arguments matches all instantiations.
    pub async fn match_all(
        &self,
        account: &str,
        pattern: impl IntoTypeDescriptor,
    ) -> Result<Vec<DecodedStruct>, RemoteError> {
        let pattern = pattern.into_type()?;
        let resources = self.get_all(account).await?;
        Ok(self
            .coder
            .filter_and_decode_resources(pattern, &resources)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_encoded_resource_urls() {
        let rest = AptosRestClient::new("https://fullnode.testnet.aptoslabs.com/v1/").unwrap();
        let url = rest
            .url(&["accounts", "0x1", "resource", "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://fullnode.testnet.aptoslabs.com/v1/accounts/0x1/resource/0x1::coin::CoinStore%3C0x1::aptos_coin::AptosCoin%3E"
        );
    }

    #[test]
    fn rejects_bad_endpoint() {
        assert!(matches!(
            AptosRestClient::new("not a url"),
            Err(RemoteError::InvalidEndpoint { .. })
        ));
    }

    #[tokio::test]
    async fn match_exact_rejects_wildcards() {
        let client = AccountResourceClient::new(
            AptosRestClient::new(TESTNET_ENDPOINT).unwrap(),
            AptosCoder::offline(),
        );
        let err = client
            .match_exact("0x1", "0x1::coin::CoinStore<any>")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Decode(DecodeError::AmbiguousType(_))));
    }
}
