//! `movecodec parse-type` / `movecodec match-type`.

use anyhow::{Context, Result};
use movecodec_core::{match_type, parse_move_type, TypeDescriptor};
use serde_json::json;

fn describe(ty: &TypeDescriptor) -> serde_json::Value {
    json!({
        "signature": ty.signature(),
        "normalized": ty.normalized_signature(),
        "qname": ty.qname,
        "reference": ty.reference,
        "mutable": ty.mutable,
        "type_args": ty.type_args.iter().map(TypeDescriptor::signature).collect::<Vec<_>>(),
        "depended_types": ty.depended_types(),
    })
}

pub fn parse(signature: &str, as_json: bool) -> Result<()> {
    let ty = parse_move_type(signature).with_context(|| format!("parse '{signature}'"))?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&describe(&ty))?);
        return Ok(());
    }
    println!("Signature:   {}", ty.signature());
    println!("Normalized:  {}", ty.normalized_signature());
    if ty.reference {
        println!("Reference:   {}", if ty.mutable { "&mut" } else { "&" });
    }
    let deps = ty.depended_types();
    if deps.is_empty() {
        println!("Depends on:  (nothing)");
    } else {
        println!("Depends on:");
        for qname in &deps {
            println!("  - {qname}");
        }
    }
    Ok(())
}

/// Exits with status 1 when the candidate does not match.
pub fn matches(pattern: &str, candidate: &str) -> Result<()> {
    let pattern = parse_move_type(pattern).with_context(|| format!("parse pattern '{pattern}'"))?;
    let candidate =
        parse_move_type(candidate).with_context(|| format!("parse candidate '{candidate}'"))?;
    if match_type(&pattern, &candidate) {
        println!("✓ {} matches {}", candidate.signature(), pattern.signature());
        Ok(())
    } else {
        println!("✗ {} does not match {}", candidate.signature(), pattern.signature());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_nested() {
        let ty = parse_move_type("&mut 0x01::pool::Pool<0x1::coin::Coin<U64>>").unwrap();
        let out = describe(&ty);
        assert_eq!(out["qname"], "0x1::pool::Pool");
        assert_eq!(out["mutable"], true);
        assert_eq!(out["normalized"], "&mut 0x1::pool::Pool<0x1::coin::Coin<u64>>");
        assert_eq!(
            out["depended_types"],
            json!(["0x1::coin::Coin", "0x1::pool::Pool"])
        );
    }
}
