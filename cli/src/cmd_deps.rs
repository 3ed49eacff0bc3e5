//! `movecodec deps`: close the local ABI set over its foreign accounts.

use crate::config::MoveCodecConfig;
use anyhow::Result;
use movecodec_codegen::{DependencyResolver, ManifestSink};
use movecodec_registry::AbiDirectory;
use serde_json::json;
use std::path::Path;
use tracing::info;

pub async fn run(config: &MoveCodecConfig, out: Option<&Path>, cache: bool, as_json: bool) -> Result<()> {
    let dir = AbiDirectory::new(&config.abi_dir);
    let mut resolver = DependencyResolver::new(config.chain.adapter(), config.fetcher()?);
    if cache && config.endpoint.is_some() {
        resolver = resolver.with_abi_cache(dir.clone());
    }
    let local = resolver.add_directory(&dir)?;
    info!(modules = local, dir = %dir.path().display(), "registered local ABIs");

    match out {
        Some(out) => {
            let mut sink = ManifestSink::new(out);
            let emitted = resolver.run(&mut sink).await?;
            info!(units = emitted, out = %out.display(), "wrote manifests");
        }
        None => {
            resolver.resolve().await?;
        }
    }

    if as_json {
        let units: Vec<_> = resolver
            .resolved()
            .iter()
            .map(|unit| {
                json!({
                    "account": unit.account,
                    "file_name": unit.file_name,
                    "fetched": unit.fetched,
                    "modules": unit.modules.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
                    "imports": resolver.imports(&unit.account).map(|i| &i.imports),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&units)?);
        return Ok(());
    }

    for unit in resolver.resolved() {
        let origin = if unit.fetched { "fetched" } else { "local" };
        println!("{} ({}, {} modules)", unit.account, origin, unit.modules.len());
        let Some(imports) = resolver.imports(&unit.account) else {
            continue;
        };
        for (account, modules) in &imports.imports {
            let modules: Vec<&str> = modules.iter().map(String::as_str).collect();
            println!("  imports {}: {}", account, modules.join(", "));
        }
    }
    Ok(())
}
