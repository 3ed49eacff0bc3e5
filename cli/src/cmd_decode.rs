//! `movecodec decode`: decode node JSON against local ABIs.
//!
//! The data file holds one value or an array of values. With `--type`
//! every value is decoded as that type; without it each value must carry
//! its own type tag (events, resources, objects).

use crate::abi::load_registry;
use crate::config::{Chain, MoveCodecConfig};
use anyhow::{Context, Result};
use movecodec_aptos::AptosCoder;
use movecodec_coder::MoveCoder;
use movecodec_core::parse_move_type;
use movecodec_sui::SuiCoder;
use serde_json::Value;
use std::path::Path;

/// The chain's coder, with its overrides installed.
pub fn chain_coder(config: &MoveCodecConfig) -> Result<MoveCoder> {
    let registry = load_registry(config)?;
    Ok(match config.chain {
        Chain::Aptos => AptosCoder::from_registry(registry).coder().clone(),
        Chain::Sui => SuiCoder::from_registry(registry).coder().clone(),
    })
}

pub async fn run(config: &MoveCodecConfig, ty: Option<&str>, data: &Path) -> Result<()> {
    let body = std::fs::read_to_string(data)
        .with_context(|| format!("read data file '{}'", data.display()))?;
    let value: Value = serde_json::from_str(&body).context("parse data JSON")?;
    let coder = chain_coder(config)?;

    let out = match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in &items {
                out.push(decode_one(&coder, ty, item).await?);
            }
            Value::Array(out)
        }
        single => decode_one(&coder, ty, &single).await?,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn decode_one(coder: &MoveCoder, ty: Option<&str>, value: &Value) -> Result<Value> {
    match ty {
        Some(sig) => {
            let ty = parse_move_type(sig).with_context(|| format!("parse type '{sig}'"))?;
            Ok(coder.decode(value, &ty).await?.to_json())
        }
        None => Ok(coder.decoded_struct(value).await?.to_json()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(rel: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../fixtures").join(rel)
    }

    #[tokio::test]
    async fn decodes_tagged_and_explicit_values() {
        let config = MoveCodecConfig {
            chain: Chain::Aptos,
            abi_dir: fixture("aptos/abi"),
            ..MoveCodecConfig::default()
        };
        let coder = chain_coder(&config).unwrap();

        let explicit = decode_one(&coder, Some("vector<u64>"), &serde_json::json!(["1", 2]))
            .await
            .unwrap();
        assert_eq!(explicit, serde_json::json!(["1", "2"]));

        let body = std::fs::read_to_string(fixture("aptos/stable-pool.json")).unwrap();
        let fixture: Value = serde_json::from_str(&body).unwrap();
        let out = decode_one(&coder, None, &fixture["resource"]).await.unwrap();
        assert!(out["data_decoded"].is_object());
        assert_eq!(out["type"], fixture["resource"]["type"]);
    }
}
