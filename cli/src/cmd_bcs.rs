//! `movecodec bcs`: decode BCS bytes with layouts compiled from local ABIs.

use crate::abi::load_registry;
use crate::config::MoveCodecConfig;
use anyhow::{Context, Result};
use movecodec_bcs::Encoding;
use movecodec_core::parse_move_type;
use movecodec_sui::SuiCoder;
use tracing::debug;

/// Prints the node-style JSON; with `typed`, the decoded value instead.
pub async fn run(
    config: &MoveCodecConfig,
    ty: &str,
    data: &str,
    encoding: &str,
    typed: bool,
) -> Result<()> {
    let encoding: Encoding = encoding.parse()?;
    let ty = parse_move_type(ty).with_context(|| format!("parse type '{ty}'"))?;
    let coder = SuiCoder::from_registry(load_registry(config)?);

    let json = coder.decode_bcs_encoded(&ty, data, encoding).await?;
    let out = if typed {
        coder.decode(&json, &ty).await?.to_json()
    } else {
        json
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    debug!(layouts = coder.bcs().cached(), "bcs layouts compiled");
    Ok(())
}
