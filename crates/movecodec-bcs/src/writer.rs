//! Chain-style JSON → BCS bytes.
//!
//! Accepts the shapes the reader produces, plus the usual loose inputs:
//! numbers or decimal strings for integers, `0x` hex or number arrays for
//! byte vectors, short addresses.

use crate::layout::{BinaryLayout, FieldLayout};
use movecodec_core::{parse_big_int, BcsError, U256};
use serde::Serialize;
use serde_json::Value;

fn invalid(expected: &BinaryLayout, got: &Value) -> BcsError {
    BcsError::InvalidValue {
        expected: expected.name(),
        got: got.to_string(),
    }
}

fn serialize<T: Serialize + ?Sized>(out: &mut Vec<u8>, value: &T) -> Result<(), BcsError> {
    let bytes = bcs::to_bytes(value).map_err(|e| BcsError::Serialize(e.to_string()))?;
    out.extend(bytes);
    Ok(())
}

/// Append a ULEB128 length prefix.
pub fn write_uleb128(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

fn integer(layout: &BinaryLayout, value: &Value, max: U256) -> Result<U256, BcsError> {
    parse_big_int(value)
        .filter(|n| *n <= max)
        .ok_or_else(|| invalid(layout, value))
}

fn address_bytes(layout: &BinaryLayout, value: &Value) -> Result<[u8; 32], BcsError> {
    let text = value.as_str().ok_or_else(|| invalid(layout, value))?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    if digits.is_empty() || digits.len() > 64 {
        return Err(invalid(layout, value));
    }
    let padded = format!("{digits:0>64}");
    let mut out = [0u8; 32];
    hex::decode_to_slice(&padded, &mut out).map_err(|_| invalid(layout, value))?;
    Ok(out)
}

/// Append the encoding of `value` laid out as `layout`.
pub fn write_value(out: &mut Vec<u8>, layout: &BinaryLayout, value: &Value) -> Result<(), BcsError> {
    match layout {
        BinaryLayout::Bool => {
            let b = value.as_bool().ok_or_else(|| invalid(layout, value))?;
            serialize(out, &b)
        }
        BinaryLayout::U8 => {
            let n = integer(layout, value, U256::from(u8::MAX))?;
            serialize(out, &n.to::<u8>())
        }
        BinaryLayout::U16 => {
            let n = integer(layout, value, U256::from(u16::MAX))?;
            serialize(out, &n.to::<u16>())
        }
        BinaryLayout::U32 => {
            let n = integer(layout, value, U256::from(u32::MAX))?;
            serialize(out, &n.to::<u32>())
        }
        BinaryLayout::U64 => {
            let n = integer(layout, value, U256::from(u64::MAX))?;
            serialize(out, &n.to::<u64>())
        }
        BinaryLayout::U128 => {
            let n = integer(layout, value, U256::from(u128::MAX))?;
            serialize(out, &n.to::<u128>())
        }
        BinaryLayout::U256 => {
            let n = integer(layout, value, U256::MAX)?;
            out.extend(n.to_le_bytes::<32>());
            Ok(())
        }
        BinaryLayout::Address => {
            out.extend(address_bytes(layout, value)?);
            Ok(())
        }
        BinaryLayout::String => {
            let s = value.as_str().ok_or_else(|| invalid(layout, value))?;
            serialize(out, s)
        }
        BinaryLayout::Vector(element) => {
            if let (BinaryLayout::U8, Some(text)) = (element.as_ref(), value.as_str()) {
                let digits = text.strip_prefix("0x").unwrap_or(text);
                let bytes = hex::decode(digits).map_err(|_| invalid(layout, value))?;
                return serialize(out, &bytes);
            }
            let items = value.as_array().ok_or_else(|| invalid(layout, value))?;
            write_uleb128(out, items.len() as u64);
            for item in items {
                write_value(out, element, item)?;
            }
            Ok(())
        }
        BinaryLayout::Struct { fields, .. } => write_fields(out, layout, fields, value),
        BinaryLayout::Enum { qname, variants } => {
            let name = value
                .get("@variant")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid(layout, value))?;
            let (index, (_, fields)) = variants
                .iter()
                .enumerate()
                .find(|(_, (v, _))| v == name)
                .ok_or_else(|| BcsError::InvalidValue {
                    expected: format!("variant of {qname}"),
                    got: name.to_string(),
                })?;
            write_uleb128(out, index as u64);
            write_fields(out, layout, fields, value)
        }
    }
}

fn write_fields(
    out: &mut Vec<u8>,
    layout: &BinaryLayout,
    fields: &[FieldLayout],
    value: &Value,
) -> Result<(), BcsError> {
    let object = value.as_object().ok_or_else(|| invalid(layout, value))?;
    for (name, field_layout) in fields {
        let field = object.get(name).ok_or_else(|| BcsError::InvalidValue {
            expected: format!("field '{name}' of {}", layout.name()),
            got: value.to_string(),
        })?;
        write_value(out, field_layout, field)?;
    }
    Ok(())
}

/// Encode a complete value.
pub fn to_bytes(layout: &BinaryLayout, value: &Value) -> Result<Vec<u8>, BcsError> {
    let mut out = Vec::new();
    write_value(&mut out, layout, value)?;
    Ok(out)
}
