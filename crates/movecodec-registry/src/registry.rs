//! `ModuleRegistry`: normalized schema store with lazy, per-account loading.
//!
//! Struct, function and enum definitions are keyed by `account::module::name`
//! with the account in canonical short form. A lookup miss triggers a fetch of
//! every module under the owning account. Concurrent misses on the same
//! account share one in-flight fetch; a failed fetch is dropped from the
//! in-flight table so the next lookup retries it.

use futures::future::{BoxFuture, FutureExt, Shared};
use movecodec_core::{
    address::{account_type_string, module_qname, SPLITTER},
    ChainAdapter, FetchError, InternalMoveEnum, InternalMoveFunction, InternalMoveModule,
    InternalMoveStruct, ModuleFetcher, OfflineFetcher, RawModule, RegistryError,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

type PendingLoad = Shared<BoxFuture<'static, Result<(), RegistryError>>>;

#[derive(Default)]
struct Inner {
    /// account::module → module
    modules: HashMap<String, Arc<InternalMoveModule>>,
    structs: HashMap<String, Arc<InternalMoveStruct>>,
    functions: HashMap<String, Arc<InternalMoveFunction>>,
    enums: HashMap<String, Arc<InternalMoveEnum>>,
    /// Accounts whose full module list has been fetched.
    loaded_accounts: HashSet<String>,
}

impl Inner {
    /// Insert under `account`. Returns false if the module was already present.
    fn insert(&mut self, module: &Arc<InternalMoveModule>, account: &str) -> bool {
        let key = module_qname(account, &module.name);
        if self.modules.contains_key(&key) {
            return false;
        }
        for s in &module.structs {
            self.structs
                .insert(format!("{key}{SPLITTER}{}", s.name), Arc::new(s.clone()));
        }
        for f in &module.functions {
            self.functions
                .insert(format!("{key}{SPLITTER}{}", f.name), Arc::new(f.clone()));
        }
        for e in &module.enums {
            self.enums
                .insert(format!("{key}{SPLITTER}{}", e.name), Arc::new(e.clone()));
        }
        self.modules.insert(key, Arc::clone(module));
        true
    }
}

/// Split `account::module::name` into its canonical account and lookup key.
fn canonical_member(qname: &str) -> Result<(String, String), RegistryError> {
    let mut parts = qname.splitn(3, SPLITTER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(account), Some(module), Some(name)) if !name.is_empty() => {
            let account = account_type_string(account);
            let key = format!("{account}{SPLITTER}{module}{SPLITTER}{name}");
            Ok((account, key))
        }
        _ => Err(RegistryError::NotQualified(qname.to_string())),
    }
}

/// Thread-safe module registry. Cloning shares the underlying maps.
#[derive(Clone)]
pub struct ModuleRegistry {
    adapter: Arc<dyn ChainAdapter>,
    fetcher: Arc<dyn ModuleFetcher>,
    inner: Arc<RwLock<Inner>>,
    /// Lock order: `in_flight` before `inner`.
    in_flight: Arc<Mutex<HashMap<String, PendingLoad>>>,
}

impl ModuleRegistry {
    pub fn new(adapter: Arc<dyn ChainAdapter>, fetcher: Arc<dyn ModuleFetcher>) -> Self {
        Self {
            adapter,
            fetcher,
            inner: Arc::new(RwLock::new(Inner::default())),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registry that only knows what is registered explicitly.
    pub fn offline(adapter: Arc<dyn ChainAdapter>) -> Self {
        Self::new(adapter, Arc::new(OfflineFetcher))
    }

    pub fn adapter(&self) -> &Arc<dyn ChainAdapter> {
        &self.adapter
    }

    /// Register a normalized module under its own address and, when it
    /// differs, under `declared_account` (the address it was fetched from).
    ///
    /// Idempotent: returns false if nothing new was added.
    pub fn register(&self, module: InternalMoveModule, declared_account: Option<&str>) -> bool {
        let account = account_type_string(&module.address);
        let module = Arc::new(module);
        let mut inner = self.inner.write().unwrap();
        let mut added = inner.insert(&module, &account);
        if let Some(declared) = declared_account {
            let declared = account_type_string(declared);
            if declared != account {
                added |= inner.insert(&module, &declared);
            }
        }
        added
    }

    /// Translate raw ABI responses through the adapter and register them.
    pub fn load_modules(
        &self,
        raw: &[RawModule],
        declared_account: Option<&str>,
    ) -> Result<Vec<InternalMoveModule>, RegistryError> {
        let modules = self.adapter.to_internal_modules(raw)?;
        for module in &modules {
            self.register(module.clone(), declared_account);
        }
        Ok(modules)
    }

    /// Mark `account` as fully loaded: later misses under it fail without a fetch.
    pub fn mark_loaded(&self, account: &str) {
        self.inner
            .write()
            .unwrap()
            .loaded_accounts
            .insert(account_type_string(account));
    }

    pub fn is_loaded(&self, account: &str) -> bool {
        self.inner
            .read()
            .unwrap()
            .loaded_accounts
            .contains(&account_type_string(account))
    }

    pub fn contains(&self, account: &str, module: &str) -> bool {
        self.inner
            .read()
            .unwrap()
            .modules
            .contains_key(&module_qname(account, module))
    }

    pub fn get_module(&self, account: &str, module: &str) -> Option<Arc<InternalMoveModule>> {
        self.inner
            .read()
            .unwrap()
            .modules
            .get(&module_qname(account, module))
            .cloned()
    }

    /// Every registered module once, ordered by qualified name.
    pub fn modules(&self) -> Vec<Arc<InternalMoveModule>> {
        let inner = self.inner.read().unwrap();
        let mut keys: Vec<&String> = inner.modules.keys().collect();
        keys.sort();
        let mut out: Vec<Arc<InternalMoveModule>> = Vec::new();
        for key in keys {
            let module = &inner.modules[key];
            if !out.iter().any(|m| Arc::ptr_eq(m, module)) {
                out.push(Arc::clone(module));
            }
        }
        out
    }

    /// Number of registered `account::module` keys, aliases included.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached struct only; never fetches.
    pub fn get_struct(&self, qname: &str) -> Option<Arc<InternalMoveStruct>> {
        let (_, key) = canonical_member(qname).ok()?;
        self.inner.read().unwrap().structs.get(&key).cloned()
    }

    /// Resolve a struct definition, fetching its account on a miss.
    pub async fn lookup_struct(&self, qname: &str) -> Result<Arc<InternalMoveStruct>, RegistryError> {
        self.resolve(qname, |inner, key| inner.structs.get(key).cloned())
            .await?
            .ok_or_else(|| unresolved(qname))
    }

    /// Resolve a function definition, fetching its account on a miss.
    pub async fn lookup_function(
        &self,
        qname: &str,
    ) -> Result<Arc<InternalMoveFunction>, RegistryError> {
        self.resolve(qname, |inner, key| inner.functions.get(key).cloned())
            .await?
            .ok_or_else(|| unresolved(qname))
    }

    /// Resolve an enum definition. A miss after loading is not an error:
    /// most qualified names are structs. A name already cached as a struct
    /// answers `None` without touching the fetcher.
    pub async fn maybe_enum(
        &self,
        qname: &str,
    ) -> Result<Option<Arc<InternalMoveEnum>>, RegistryError> {
        let (_, key) = canonical_member(qname)?;
        if self.inner.read().unwrap().structs.contains_key(&key) {
            return Ok(None);
        }
        self.resolve(qname, |inner, key| inner.enums.get(key).cloned())
            .await
    }

    async fn resolve<T>(
        &self,
        qname: &str,
        pick: fn(&Inner, &str) -> Option<Arc<T>>,
    ) -> Result<Option<Arc<T>>, RegistryError> {
        let (account, key) = canonical_member(qname)?;
        let cached = {
            let inner = self.inner.read().unwrap();
            pick(&inner, &key)
        };
        if cached.is_some() {
            return Ok(cached);
        }
        self.load_account(&account).await?;
        let inner = self.inner.read().unwrap();
        Ok(pick(&inner, &key))
    }

    /// Fetch and register every module under `account`, unless already loaded.
    ///
    /// Concurrent callers for the same account share a single fetch.
    pub async fn load_account(&self, account: &str) -> Result<(), RegistryError> {
        let account = account_type_string(account);
        let pending = self.join_or_start(
            &account,
            |inner| inner.loaded_accounts.contains(&account),
            || self.clone().fetch_account(account.clone()).boxed(),
        );
        match pending {
            Some(pending) => pending.await,
            None => Ok(()),
        }
    }

    /// Fetch a single module unless it is already registered.
    pub async fn load_module(&self, account: &str, module: &str) -> Result<(), RegistryError> {
        let key = module_qname(account, module);
        let pending = self.join_or_start(
            &key,
            |inner| inner.modules.contains_key(&key),
            || {
                self.clone()
                    .fetch_module(account_type_string(account), module.to_string())
                    .boxed()
            },
        );
        match pending {
            Some(pending) => pending.await,
            None => Ok(()),
        }
    }

    fn join_or_start(
        &self,
        key: &str,
        done: impl FnOnce(&Inner) -> bool,
        start: impl FnOnce() -> BoxFuture<'static, Result<(), RegistryError>>,
    ) -> Option<PendingLoad> {
        let mut in_flight = self.in_flight.lock().unwrap();
        if done(&self.inner.read().unwrap()) {
            return None;
        }
        let pending = in_flight
            .entry(key.to_string())
            .or_insert_with(|| start().shared());
        Some(pending.clone())
    }

    async fn fetch_account(self, account: String) -> Result<(), RegistryError> {
        debug!(account = %account, "fetching account modules");
        let result = match self.fetcher.fetch_modules(&account).await {
            Ok(raw) => self.load_modules(&raw, Some(&account)).map(|modules| {
                self.mark_loaded(&account);
                debug!(account = %account, modules = modules.len(), "registered account modules");
            }),
            Err(e) => Err(RegistryError::Fetch(e)),
        };
        if let Err(e) = &result {
            warn!(account = %account, error = %e, "account module fetch failed");
        }
        self.in_flight.lock().unwrap().remove(&account);
        result
    }

    async fn fetch_module(self, account: String, module: String) -> Result<(), RegistryError> {
        let key = module_qname(&account, &module);
        debug!(module = %key, "fetching module");
        let result = match self.fetcher.fetch_module(&account, &module).await {
            Ok(raw) => self
                .load_modules(std::slice::from_ref(&raw), Some(&account))
                .and_then(|_| {
                    if self.contains(&account, &module) {
                        Ok(())
                    } else {
                        Err(RegistryError::Fetch(FetchError::ModuleNotFound {
                            account: account.clone(),
                            module: module.clone(),
                        }))
                    }
                }),
            Err(e) => Err(RegistryError::Fetch(e)),
        };
        self.in_flight.lock().unwrap().remove(&key);
        result
    }
}

fn unresolved(qname: &str) -> RegistryError {
    let account = qname
        .split(SPLITTER)
        .next()
        .map(account_type_string)
        .unwrap_or_default();
    RegistryError::UnresolvedType {
        qname: qname.to_string(),
        account,
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().unwrap();
        f.debug_struct("ModuleRegistry")
            .field("chain", &self.adapter.chain_family())
            .field("modules", &inner.modules.len())
            .field("loaded_accounts", &inner.loaded_accounts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::StaticFetcher;
    use crate::normalized::NormalizedAdapter;
    use serde_json::json;

    fn coin_module(address: &str) -> serde_json::Value {
        json!({
            "address": address,
            "name": "coin",
            "structs": [{
                "name": "Coin",
                "abilities": ["store"],
                "type_params": [{"constraints": []}],
                "fields": [{"name": "value", "type": "u64"}]
            }],
            "functions": [{
                "name": "value",
                "visibility": "public",
                "params": ["&0x1::coin::Coin<T0>"],
                "return": ["u64"]
            }],
            "enums": [{
                "name": "Kind",
                "variants": {"A": [], "B": [{"name": "x", "type": "u8"}]}
            }]
        })
    }

    fn registry_with(fetcher: Arc<StaticFetcher>) -> ModuleRegistry {
        ModuleRegistry::new(Arc::new(NormalizedAdapter::default()), fetcher)
    }

    #[tokio::test]
    async fn lookup_triggers_lazy_load() {
        let fetcher = Arc::new(StaticFetcher::new().with_account("0x1", vec![coin_module("0x1")]));
        let registry = registry_with(fetcher.clone());

        let s = registry.lookup_struct("0x1::coin::Coin").await.unwrap();
        assert_eq!(s.fields[0].name, "value");
        // padded form resolves to the same entry without another fetch
        let f = registry
            .lookup_function("0x0000000000000000000000000000000000000000000000000000000000000001::coin::value")
            .await
            .unwrap();
        assert_eq!(f.returns[0].qname, "u64");
        assert!(registry.maybe_enum("0x1::coin::Kind").await.unwrap().is_some());
        assert!(registry.maybe_enum("0x1::coin::Coin").await.unwrap().is_none());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn cached_struct_skips_enum_fetch() {
        let fetcher = Arc::new(StaticFetcher::new());
        let registry = registry_with(fetcher.clone());
        registry.load_modules(&[coin_module("0x1")], None).unwrap();

        assert!(!registry.is_loaded("0x1"));
        assert!(registry.maybe_enum("0x1::coin::Coin").await.unwrap().is_none());
        assert!(registry.maybe_enum("0x1::coin::Kind").await.unwrap().is_some());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn miss_in_loaded_account_is_hard_error() {
        let fetcher = Arc::new(StaticFetcher::new().with_account("0x1", vec![coin_module("0x1")]));
        let registry = registry_with(fetcher.clone());
        registry.lookup_struct("0x1::coin::Coin").await.unwrap();

        let err = registry.lookup_struct("0x1::coin::Missing").await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UnresolvedType { ref account, .. } if account == "0x1"
        ));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_fetch() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_account("0x1", vec![coin_module("0x1")])
                .with_delay(std::time::Duration::from_millis(20)),
        );
        let registry = registry_with(fetcher.clone());

        let (a, b, c) = tokio::join!(
            registry.lookup_struct("0x1::coin::Coin"),
            registry.lookup_function("0x1::coin::value"),
            registry.lookup_struct("0x01::coin::Coin"),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_account("0x1", vec![coin_module("0x1")])
                .fail_next(1),
        );
        let registry = registry_with(fetcher.clone());

        let err = registry.lookup_struct("0x1::coin::Coin").await.unwrap_err();
        assert!(matches!(err, RegistryError::Fetch(FetchError::Transport { .. })));
        assert!(!registry.is_loaded("0x1"));

        registry.lookup_struct("0x1::coin::Coin").await.unwrap();
        assert_eq!(fetcher.calls(), 2);
    }

    #[test]
    fn register_is_idempotent_and_aliases() {
        let registry = ModuleRegistry::offline(Arc::new(NormalizedAdapter::default()));
        let module: InternalMoveModule = serde_json::from_value(coin_module("0x1")).unwrap();

        assert!(registry.register(module.clone(), Some("0xabc")));
        assert!(!registry.register(module.clone(), Some("0xabc")));
        assert!(registry.contains("0x1", "coin"));
        assert!(registry.contains("0x0abc", "coin"));
        assert!(registry.get_struct("0xabc::coin::Coin").is_some());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.modules().len(), 1);
    }

    #[tokio::test]
    async fn offline_registry_reports_fetch_failure() {
        let registry = ModuleRegistry::offline(Arc::new(NormalizedAdapter::default()));
        let err = registry.lookup_struct("0x5::pool::Pool").await.unwrap_err();
        assert!(matches!(err, RegistryError::Fetch(FetchError::NotFound { .. })));
        assert!(matches!(
            registry.lookup_struct("Pool").await,
            Err(RegistryError::NotQualified(_))
        ));
    }

    #[tokio::test]
    async fn single_module_load() {
        let fetcher = Arc::new(StaticFetcher::new().with_account("0x1", vec![coin_module("0x1")]));
        let registry = registry_with(fetcher.clone());
        registry.load_module("0x1", "coin").await.unwrap();
        registry.load_module("0x1", "coin").await.unwrap();
        assert!(registry.contains("0x1", "coin"));
        assert_eq!(fetcher.calls(), 1);
        assert!(registry.load_module("0x1", "table").await.is_err());
    }
}
