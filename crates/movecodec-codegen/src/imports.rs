//! Per-account import bookkeeping.

use indexmap::{IndexMap, IndexSet};
use movecodec_core::{
    address::{account_type_string, module_qname, module_qname_for_type},
    InternalMoveModule,
};
use serde::Serialize;

/// Accounts treated as already generated: the framework packages.
pub const SYSTEM_ACCOUNTS: &[&str] = &["0x1", "0x2", "0x3"];

/// Modules an account's generated code imports, grouped by foreign account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountImports {
    pub account: String,
    /// Output unit (ABI file stem) the account's modules were loaded from.
    pub file_name: String,
    pub imports: IndexMap<String, IndexSet<String>>,
}

impl AccountImports {
    pub fn new(account: &str, file_name: impl Into<String>) -> Self {
        Self {
            account: account_type_string(account),
            file_name: file_name.into(),
            imports: IndexMap::new(),
        }
    }

    /// References into the account's own modules are not imports.
    pub fn add_import(&mut self, account: &str, module: &str) {
        let account = account_type_string(account);
        if account == self.account {
            return;
        }
        self.imports
            .entry(account)
            .or_default()
            .insert(module.to_string());
    }

    pub fn imported_accounts(&self) -> impl Iterator<Item = &str> {
        self.imports.keys().map(String::as_str)
    }
}

/// Import table for every known account plus the set still to be fetched.
#[derive(Debug, Clone, Default)]
pub struct AccountRegister {
    accounts: IndexMap<String, AccountImports>,
    /// `account::module` → owning account.
    module_accounts: IndexMap<String, String>,
    pending: IndexSet<String>,
}

impl AccountRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// A register that never schedules the framework accounts.
    pub fn with_system_accounts() -> Self {
        let mut register = Self::new();
        for account in SYSTEM_ACCOUNTS {
            register.mark_known(account, *account);
        }
        register
    }

    pub fn mark_known(&mut self, account: &str, file_name: &str) {
        let account = account_type_string(account);
        self.accounts
            .entry(account.clone())
            .or_insert_with(|| AccountImports::new(&account, file_name));
        self.pending.shift_remove(&account);
    }

    pub fn is_known(&self, account: &str) -> bool {
        self.accounts.contains_key(&account_type_string(account))
    }

    /// Walk a module's struct fields and function signatures, recording the
    /// foreign modules it needs and scheduling unknown accounts.
    pub fn register(&mut self, module: &InternalMoveModule, file_name: &str) -> &AccountImports {
        let account = account_type_string(&module.address);
        self.pending.shift_remove(&account);
        self.module_accounts
            .insert(module_qname(&account, &module.name), account.clone());

        let field_types = module
            .structs
            .iter()
            .flat_map(|s| s.fields.iter().map(|f| &f.type_));
        let function_types = module
            .functions
            .iter()
            .flat_map(|f| f.params.iter().chain(f.returns.iter()));
        let enum_types = module
            .enums
            .iter()
            .flat_map(|e| e.variants.values().flatten().map(|f| &f.type_));

        let imports = self
            .accounts
            .entry(account.clone())
            .or_insert_with(|| AccountImports::new(&account, file_name));
        let mut discovered = Vec::new();
        for ty in field_types.chain(function_types).chain(enum_types) {
            for qname in ty.depended_types() {
                let Some((dep_account, dep_module)) = module_qname_for_type(&qname) else {
                    continue;
                };
                imports.add_import(dep_account, dep_module);
                discovered.push(account_type_string(dep_account));
            }
        }
        for dep in discovered {
            if !self.accounts.contains_key(&dep) {
                self.pending.insert(dep);
            }
        }
        &self.accounts[&account]
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_pending(&self, account: &str) -> bool {
        self.pending.contains(&account_type_string(account))
    }

    pub fn imports(&self, account: &str) -> Option<&AccountImports> {
        self.accounts.get(&account_type_string(account))
    }

    /// Import info for the account owning `account::module`.
    pub fn imports_for_module(&self, module_qname: &str) -> Option<&AccountImports> {
        self.module_accounts
            .get(module_qname)
            .and_then(|account| self.accounts.get(account))
    }

    pub fn accounts(&self) -> impl Iterator<Item = &AccountImports> {
        self.accounts.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn module(value: serde_json::Value) -> InternalMoveModule {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn own_account_is_not_an_import() {
        let mut imports = AccountImports::new("0xa", "a");
        imports.add_import("0x0a", "other");
        imports.add_import("0x1", "coin");
        imports.add_import("0x1", "coin");
        assert_eq!(imports.imports.len(), 1);
        assert_eq!(imports.imports["0x1"].len(), 1);
    }

    #[test]
    fn register_schedules_unknown_accounts() {
        let mut register = AccountRegister::with_system_accounts();
        let m = module(json!({
            "address": "0x00aa",
            "name": "market",
            "structs": [{
                "name": "Book",
                "fields": [
                    {"name": "coin", "type": "0x2::coin::Coin<0xbb::usd::USD>"},
                    {"name": "self_ref", "type": "0xaa::market::Order"}
                ]
            }],
            "functions": [{
                "name": "place",
                "visibility": "public",
                "params": ["&signer", "0xcc::oracle::Price"],
                "return": ["vector<0xbb::usd::USD>"]
            }]
        }));

        let imports = register.register(&m, "0xaa").clone();
        assert_eq!(imports.account, "0xaa");
        assert_eq!(
            imports.imported_accounts().collect::<Vec<_>>(),
            vec!["0xbb", "0x2", "0xcc"]
        );
        // the framework account is imported but never fetched
        let pending: Vec<&str> = register.pending().collect();
        assert_eq!(pending, vec!["0xbb", "0xcc"]);
        assert!(register.imports_for_module("0xaa::market").is_some());

        register.mark_known("0xbb", "0xbb");
        assert!(!register.is_pending("0xbb"));
        assert!(register.is_pending("0x0cc"));
    }
}
