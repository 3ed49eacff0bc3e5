//! Capability interfaces a chain family plugs into the core.
//!
//! [`ChainAdapter`] covers the synchronous, shape-level concerns (ABI
//! translation, value envelopes, integer wire forms). [`ModuleFetcher`] is
//! the network side and is the only async seam.

use crate::chain::ChainFamily;
use crate::error::{FetchError, TranslateError};
use crate::model::{InternalMoveModule, InternalMoveStruct};
use crate::types::TypeDescriptor;
use crate::value::parse_big_int;
use alloy_primitives::U256;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// A module ABI exactly as the chain's RPC returned it.
pub type RawModule = Value;

/// Chain-specific shape knowledge.
///
/// Implementations must be `Send + Sync` so one adapter can be shared by
/// every coder and registry built on it.
pub trait ChainAdapter: Send + Sync {
    fn chain_family(&self) -> ChainFamily;

    /// Translate raw ABI responses into the normalized model.
    fn to_internal_modules(
        &self,
        raw: &[RawModule],
    ) -> Result<Vec<InternalMoveModule>, TranslateError>;

    /// Drop implicit parameters that never appear at a call site
    /// (a leading `&signer`, a trailing `&mut TxContext`).
    fn meaningful_function_params(&self, params: &[TypeDescriptor]) -> Vec<TypeDescriptor>;

    /// Runtime type tag of a wire object (event, resource, object).
    fn get_type(&self, value: &Value) -> Option<String>;

    /// Field-bearing payload of a wire object.
    fn get_data<'a>(&self, value: &'a Value) -> &'a Value;

    /// Structs that can be emitted as events, keyed by qualified name.
    fn event_structs(&self, modules: &[InternalMoveModule]) -> IndexMap<String, InternalMoveStruct>;

    /// Wire form of `u64`/`u128`/`u256`. Decimal strings and JSON numbers by default.
    fn decode_big_int(&self, value: &Value) -> Option<U256> {
        parse_big_int(value)
    }
}

/// Network retrieval of published module ABIs.
#[async_trait]
pub trait ModuleFetcher: Send + Sync + 'static {
    /// Every module published under `account`.
    async fn fetch_modules(&self, account: &str) -> Result<Vec<RawModule>, FetchError>;

    /// A single module.
    async fn fetch_module(&self, account: &str, module: &str) -> Result<RawModule, FetchError>;
}

#[async_trait]
impl<T: ModuleFetcher + ?Sized> ModuleFetcher for Arc<T> {
    async fn fetch_modules(&self, account: &str) -> Result<Vec<RawModule>, FetchError> {
        (**self).fetch_modules(account).await
    }

    async fn fetch_module(&self, account: &str, module: &str) -> Result<RawModule, FetchError> {
        (**self).fetch_module(account, module).await
    }
}

/// Fetcher that never reaches the network. Every lookup for an unloaded
/// account fails with `NotFound`; useful when all ABIs are preloaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

#[async_trait]
impl ModuleFetcher for OfflineFetcher {
    async fn fetch_modules(&self, account: &str) -> Result<Vec<RawModule>, FetchError> {
        Err(FetchError::NotFound {
            account: account.to_string(),
        })
    }

    async fn fetch_module(&self, account: &str, module: &str) -> Result<RawModule, FetchError> {
        Err(FetchError::ModuleNotFound {
            account: account.to_string(),
            module: module.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_fetcher_reports_not_found() {
        let fetcher = Arc::new(OfflineFetcher);
        let err = fetcher.fetch_modules("0x1").await.unwrap_err();
        assert_eq!(err.account(), "0x1");
        assert!(!err.is_retryable());
        assert!(matches!(
            fetcher.fetch_module("0x1", "coin").await,
            Err(FetchError::ModuleNotFound { .. })
        ));
    }
}
