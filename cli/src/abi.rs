//! Local ABI directory loading shared by the decoding commands.

use crate::config::MoveCodecConfig;
use anyhow::{bail, Context, Result};
use movecodec_core::account_type_string;
use movecodec_registry::{read_abi_file, ModuleRegistry};
use std::path::PathBuf;
use tracing::debug;

/// Every `.json` file under `dir`, recursively.
pub fn abi_files(dir: &std::path::Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Registry preloaded with every ABI file under `config.abi_dir`.
///
/// Without an endpoint the loaded accounts are marked complete, so a
/// missing type fails fast instead of probing the directory again.
pub fn load_registry(config: &MoveCodecConfig) -> Result<ModuleRegistry> {
    let adapter = config.chain.adapter();
    let registry = match &config.endpoint {
        Some(_) => ModuleRegistry::new(adapter, config.fetcher()?),
        None => ModuleRegistry::offline(adapter),
    };

    let files = abi_files(&config.abi_dir);
    if files.is_empty() && config.endpoint.is_none() {
        bail!("no ABI files found in '{}'", config.abi_dir.display());
    }
    for path in files {
        let raw = read_abi_file(&path)?;
        let modules = registry
            .load_modules(&raw, None)
            .with_context(|| format!("translate '{}'", path.display()))?;
        debug!(file = %path.display(), modules = modules.len(), "loaded ABI file");
        if config.endpoint.is_none() {
            for module in &modules {
                registry.mark_loaded(&account_type_string(&module.address));
            }
        }
    }
    Ok(registry)
}
