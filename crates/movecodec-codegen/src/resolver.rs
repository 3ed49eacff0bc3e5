//! Fixed-point dependency resolution across accounts.
//!
//! Local ABI files are registered first; every account they reference that
//! is not yet known lands in the pending set. `resolve` then fetches pending
//! accounts until none remain. An account leaves the pending set as soon
//! as one of its modules is registered, so each pass strictly shrinks the
//! set or adds accounts not seen before, and the loop terminates.

use crate::imports::{AccountImports, AccountRegister};
use crate::sink::CodegenSink;
use movecodec_core::{
    address::account_type_string, ChainAdapter, CodegenError, InternalMoveModule,
    ModuleFetcher, RawModule,
};
use movecodec_registry::AbiDirectory;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    /// Accepting local ABI files.
    Discovering,
    /// Fetching pending accounts.
    Resolving,
    Done,
}

/// One output unit: the modules loaded from a single ABI file or fetch.
#[derive(Debug, Clone)]
pub struct ResolvedAccount {
    pub account: String,
    pub file_name: String,
    pub modules: Vec<InternalMoveModule>,
    /// Raw modules as received, for caching.
    pub raw: Vec<RawModule>,
    /// Whether the modules came from a network fetch.
    pub fetched: bool,
}

pub struct DependencyResolver {
    adapter: Arc<dyn ChainAdapter>,
    fetcher: Arc<dyn ModuleFetcher>,
    register: AccountRegister,
    resolved: Vec<ResolvedAccount>,
    cache: Option<AbiDirectory>,
    state: ResolverState,
}

impl DependencyResolver {
    /// A resolver with the framework accounts already known.
    pub fn new(adapter: Arc<dyn ChainAdapter>, fetcher: Arc<dyn ModuleFetcher>) -> Self {
        Self {
            adapter,
            fetcher,
            register: AccountRegister::with_system_accounts(),
            resolved: Vec::new(),
            cache: None,
            state: ResolverState::Discovering,
        }
    }

    /// Write fetched raw modules back to `dir` as `<account>.json`.
    pub fn with_abi_cache(mut self, dir: AbiDirectory) -> Self {
        self.cache = Some(dir);
        self
    }

    /// Start from an explicit register instead of the framework defaults.
    pub fn with_register(mut self, register: AccountRegister) -> Self {
        self.register = register;
        self
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    pub fn register(&self) -> &AccountRegister {
        &self.register
    }

    pub fn resolved(&self) -> &[ResolvedAccount] {
        &self.resolved
    }

    pub fn imports(&self, account: &str) -> Option<&AccountImports> {
        self.register.imports(account)
    }

    /// Register raw modules read from a local ABI file.
    pub fn add_local(&mut self, file_name: &str, raw: Vec<RawModule>) -> Result<usize, CodegenError> {
        let modules = self
            .adapter
            .to_internal_modules(&raw)
            .map_err(|source| CodegenError::Translate {
                account: file_name.to_string(),
                source,
            })?;
        let account = modules
            .first()
            .map(|m| account_type_string(&m.address))
            .unwrap_or_else(|| file_name.to_string());
        for module in &modules {
            self.register.register(module, file_name);
        }
        debug!(file = file_name, modules = modules.len(), "registered local ABI");
        let count = modules.len();
        self.resolved.push(ResolvedAccount {
            account,
            file_name: file_name.to_string(),
            modules,
            raw,
            fetched: false,
        });
        Ok(count)
    }

    /// Register every ABI file in `dir`.
    pub fn add_directory(&mut self, dir: &AbiDirectory) -> Result<usize, CodegenError> {
        let files = dir.load_all().map_err(|e| CodegenError::Sink {
            module: dir.path().display().to_string(),
            reason: e.to_string(),
        })?;
        let mut total = 0;
        for (file_name, raw) in files {
            total += self.add_local(&file_name, raw)?;
        }
        Ok(total)
    }

    /// Fetch pending accounts until none remain.
    pub async fn resolve(&mut self) -> Result<&[ResolvedAccount], CodegenError> {
        self.state = ResolverState::Resolving;
        while self.register.has_pending() {
            let batch: Vec<String> = self.register.pending().map(str::to_string).collect();
            for account in batch {
                // an earlier fetch in this pass may have covered it
                if !self.register.is_pending(&account) {
                    continue;
                }
                self.resolve_account(&account).await?;
            }
        }
        self.state = ResolverState::Done;
        info!(accounts = self.resolved.len(), "dependency resolution complete");
        Ok(&self.resolved)
    }

    async fn resolve_account(&mut self, account: &str) -> Result<(), CodegenError> {
        info!(account, "downloading dependent modules");
        let raw = self
            .fetcher
            .fetch_modules(account)
            .await
            .map_err(|source| CodegenError::Fetch {
                account: account.to_string(),
                source,
            })?;
        let modules = self
            .adapter
            .to_internal_modules(&raw)
            .map_err(|source| CodegenError::Translate {
                account: account.to_string(),
                source,
            })?;

        for module in &modules {
            self.register.register(module, account);
        }
        if modules.is_empty() || self.register.is_pending(account) {
            return Err(CodegenError::NoProgress {
                account: account.to_string(),
            });
        }

        if let Some(cache) = &self.cache {
            match cache.write_account(account, &raw) {
                Ok(path) => debug!(account, path = %path.display(), "cached fetched ABI"),
                Err(e) => warn!(account, error = %e, "failed to cache fetched ABI"),
            }
        }

        self.resolved.push(ResolvedAccount {
            account: account_type_string(account),
            file_name: account_type_string(account),
            modules,
            raw,
            fetched: true,
        });
        Ok(())
    }

    /// Resolve, then hand every output unit to `sink` in registration order.
    pub async fn run(&mut self, sink: &mut dyn CodegenSink) -> Result<usize, CodegenError> {
        self.resolve().await?;
        let mut emitted = 0;
        for unit in &self.resolved {
            let imports = self
                .register
                .imports(&unit.account)
                .cloned()
                .unwrap_or_else(|| AccountImports::new(&unit.account, unit.file_name.clone()));
            let events = self.adapter.event_structs(&unit.modules);
            sink.emit(unit, &imports, &events)?;
            emitted += 1;
        }
        sink.finish()?;
        Ok(emitted)
    }
}

impl std::fmt::Debug for DependencyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyResolver")
            .field("state", &self.state)
            .field("resolved", &self.resolved.len())
            .finish()
    }
}
