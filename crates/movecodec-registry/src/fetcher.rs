//! In-memory `ModuleFetcher`.
//!
//! Serves preloaded raw modules per account and counts every request, which
//! makes it the fetcher of choice for embedding snapshots and for tests.

use async_trait::async_trait;
use movecodec_core::{address::account_type_string, FetchError, ModuleFetcher, RawModule};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct StaticFetcher {
    accounts: HashMap<String, Vec<RawModule>>,
    /// Field name holding a raw module's name (`name` for normalized and
    /// Sui modules, `abi.name` for Aptos).
    name_pointer: Option<String>,
    delay: Option<Duration>,
    fail_remaining: AtomicUsize,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `modules` for `account`.
    pub fn with_account(mut self, account: &str, modules: Vec<RawModule>) -> Self {
        self.accounts
            .entry(account_type_string(account))
            .or_default()
            .extend(modules);
        self
    }

    /// JSON pointer to the module name inside a raw module, e.g. `/abi/name`.
    pub fn with_name_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.name_pointer = Some(pointer.into());
        self
    }

    /// Sleep before answering, to widen race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail the next `n` requests with a transport error.
    pub fn fail_next(self, n: usize) -> Self {
        self.fail_remaining.store(n, Ordering::SeqCst);
        self
    }

    /// Number of fetch requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin(&self, account: &str) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failed = self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(FetchError::Transport {
                account: account.to_string(),
                reason: "injected failure".into(),
            });
        }
        Ok(())
    }

    fn module_name<'a>(&self, raw: &'a RawModule) -> Option<&'a str> {
        let pointer = self.name_pointer.as_deref().unwrap_or("/name");
        raw.pointer(pointer).and_then(|v| v.as_str())
    }
}

#[async_trait]
impl ModuleFetcher for StaticFetcher {
    async fn fetch_modules(&self, account: &str) -> Result<Vec<RawModule>, FetchError> {
        self.begin(account).await?;
        self.accounts
            .get(&account_type_string(account))
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                account: account.to_string(),
            })
    }

    async fn fetch_module(&self, account: &str, module: &str) -> Result<RawModule, FetchError> {
        self.begin(account).await?;
        self.accounts
            .get(&account_type_string(account))
            .and_then(|modules| {
                modules
                    .iter()
                    .find(|m| self.module_name(m) == Some(module))
                    .cloned()
            })
            .ok_or_else(|| FetchError::ModuleNotFound {
                account: account.to_string(),
                module: module.to_string(),
            })
    }
}
