//! On-disk ABI cache: one `<account>.json` file per account.
//!
//! A file holds either a single raw module, an array of raw modules, or an
//! RPC envelope `{"result": ...}` around either. The directory doubles as a
//! [`ModuleFetcher`] so offline runs resolve dependencies from disk.

use async_trait::async_trait;
use movecodec_core::{
    address::{account_address_string, account_type_string},
    FetchError, ModuleFetcher, RawModule,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AbiFileError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Split an ABI file's content into raw modules.
pub fn split_modules(value: Value) -> Vec<RawModule> {
    match value {
        Value::Object(mut map) if map.contains_key("result") && map.len() <= 3 => {
            map.remove("result").map(split_modules).unwrap_or_default()
        }
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Read and split one ABI file.
pub fn read_abi_file(path: &Path) -> Result<Vec<RawModule>, AbiFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| AbiFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| AbiFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(split_modules(value))
}

#[derive(Debug, Clone)]
pub struct AbiDirectory {
    dir: PathBuf,
}

impl AbiDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// All `.json` files under the directory, recursively, sorted by path.
    pub fn files(&self) -> Result<Vec<PathBuf>, AbiFileError> {
        if !self.dir.is_dir() {
            return Err(AbiFileError::NotADirectory(self.dir.clone()));
        }
        let mut files = collect_json(&self.dir)?;
        files.sort();
        Ok(files)
    }

    /// Every file as `(account, raw modules)`; the account is the file stem.
    pub fn load_all(&self) -> Result<Vec<(String, Vec<RawModule>)>, AbiFileError> {
        self.files()?
            .into_iter()
            .map(|path| {
                let account = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                read_abi_file(&path).map(|modules| (account, modules))
            })
            .collect()
    }

    /// Raw modules cached for `account`, trying short and full address file names.
    pub fn read_account(&self, account: &str) -> Result<Option<Vec<RawModule>>, AbiFileError> {
        let mut candidates = vec![account.to_string(), account_type_string(account)];
        if let Ok(full) = account_address_string(account) {
            candidates.push(full);
        }
        for name in candidates {
            let path = self.dir.join(format!("{name}.json"));
            if path.is_file() {
                return read_abi_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Cache raw modules for `account` as `<account>.json`.
    pub fn write_account(&self, account: &str, modules: &[RawModule]) -> Result<PathBuf, AbiFileError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| AbiFileError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(format!("{}.json", account_type_string(account)));
        let body = serde_json::to_string_pretty(modules).map_err(|source| AbiFileError::Json {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, body).map_err(|source| AbiFileError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn collect_json(dir: &Path) -> Result<Vec<PathBuf>, AbiFileError> {
    let io = |source| AbiFileError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.is_dir() {
            files.extend(collect_json(&path)?);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
    Ok(files)
}

/// Module name of a raw module in any of the supported shapes.
fn raw_module_name(raw: &RawModule) -> Option<&str> {
    raw.pointer("/abi/name")
        .or_else(|| raw.get("name"))
        .and_then(Value::as_str)
}

#[async_trait]
impl ModuleFetcher for AbiDirectory {
    async fn fetch_modules(&self, account: &str) -> Result<Vec<RawModule>, FetchError> {
        match self.read_account(account) {
            Ok(Some(modules)) => Ok(modules),
            Ok(None) => Err(FetchError::NotFound {
                account: account.to_string(),
            }),
            Err(e) => Err(FetchError::InvalidResponse {
                account: account.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn fetch_module(&self, account: &str, module: &str) -> Result<RawModule, FetchError> {
        self.fetch_modules(account)
            .await?
            .into_iter()
            .find(|m| raw_module_name(m) == Some(module))
            .ok_or_else(|| FetchError::ModuleNotFound {
                account: account.to_string(),
                module: module.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "movecodec-abi-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn splits_envelopes() {
        assert_eq!(split_modules(json!([{"a": 1}, {"b": 2}])).len(), 2);
        assert_eq!(
            split_modules(json!({"jsonrpc": "2.0", "id": 1, "result": [{"a": 1}]})),
            vec![json!({"a": 1})]
        );
        assert_eq!(split_modules(json!({"name": "m"})).len(), 1);
    }

    #[tokio::test]
    async fn write_then_fetch() {
        let dir = AbiDirectory::new(temp_dir("roundtrip"));
        let modules = vec![
            json!({"abi": {"address": "0x1", "name": "coin"}}),
            json!({"abi": {"address": "0x1", "name": "table"}}),
        ];
        dir.write_account("0x0001", &modules).unwrap();

        let fetched = dir.fetch_modules("0x1").await.unwrap();
        assert_eq!(fetched, modules);
        let table = dir.fetch_module("0x1", "table").await.unwrap();
        assert_eq!(table["abi"]["name"], "table");
        assert!(matches!(
            dir.fetch_modules("0x2").await,
            Err(FetchError::NotFound { .. })
        ));

        let all = dir.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, "0x1");
        let _ = std::fs::remove_dir_all(dir.path());
    }

    #[test]
    fn missing_directory() {
        let dir = AbiDirectory::new(temp_dir("missing"));
        assert!(matches!(dir.files(), Err(AbiFileError::NotADirectory(_))));
    }
}
