//! BCS bytes → chain-style JSON.
//!
//! Output mirrors what a node's JSON API returns for the same value:
//! `u64` and wider as decimal strings, addresses as `0x` + 64 hex digits,
//! byte vectors as arrays of numbers, structs as objects in field order.

use crate::layout::{BinaryLayout, FieldLayout};
use movecodec_core::{BcsError, U256};
use serde_json::{Map, Value};

pub struct BcsReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> BcsReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], BcsError> {
        if self.remaining() < n {
            return Err(BcsError::UnexpectedEof {
                offset: self.offset,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], BcsError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, BcsError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, BcsError> {
        let offset = self.offset;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(BcsError::InvalidBool { byte, offset }),
        }
    }

    /// ULEB128-encoded `u32`, as used for lengths and variant tags.
    ///
    /// Only the shortest encoding is accepted: a final byte of zero after
    /// a continuation byte is rejected.
    pub fn read_uleb128(&mut self) -> Result<u64, BcsError> {
        let start = self.offset;
        let mut value: u64 = 0;
        for shift in (0..32).step_by(7) {
            let byte = self.read_u8()?;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                if shift > 0 && byte == 0 {
                    return Err(BcsError::NonCanonicalUleb128 { offset: start });
                }
                if value > u64::from(u32::MAX) {
                    break;
                }
                return Ok(value);
            }
        }
        Err(BcsError::Uleb128Overflow { offset: start })
    }

    fn read_len(&mut self) -> Result<usize, BcsError> {
        Ok(self.read_uleb128()? as usize)
    }

    /// Read one value laid out as `layout`.
    pub fn read(&mut self, layout: &BinaryLayout) -> Result<Value, BcsError> {
        Ok(match layout {
            BinaryLayout::Bool => Value::Bool(self.read_bool()?),
            BinaryLayout::U8 => Value::from(self.read_u8()?),
            BinaryLayout::U16 => Value::from(u16::from_le_bytes(self.take_array()?)),
            BinaryLayout::U32 => Value::from(u32::from_le_bytes(self.take_array()?)),
            BinaryLayout::U64 => {
                Value::String(u64::from_le_bytes(self.take_array()?).to_string())
            }
            BinaryLayout::U128 => {
                Value::String(u128::from_le_bytes(self.take_array()?).to_string())
            }
            BinaryLayout::U256 => {
                let bytes: [u8; 32] = self.take_array()?;
                Value::String(U256::from_le_bytes(bytes).to_string())
            }
            BinaryLayout::Address => {
                Value::String(format!("0x{}", hex::encode(self.take(32)?)))
            }
            BinaryLayout::String => {
                let len = self.read_len()?;
                let offset = self.offset;
                let bytes = self.take(len)?;
                let s = std::str::from_utf8(bytes).map_err(|_| BcsError::InvalidUtf8 { offset })?;
                Value::String(s.to_string())
            }
            BinaryLayout::Vector(element) => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len.min(self.remaining()));
                for _ in 0..len {
                    items.push(self.read(element)?);
                }
                Value::Array(items)
            }
            BinaryLayout::Struct { fields, .. } => Value::Object(self.read_fields(fields)?),
            BinaryLayout::Enum { qname, variants } => {
                let index = self.read_uleb128()?;
                let (name, fields) =
                    variants
                        .get(index as usize)
                        .ok_or_else(|| BcsError::InvalidVariant {
                            type_: qname.clone(),
                            variant: index,
                        })?;
                let mut out = Map::new();
                out.insert("@variant".into(), Value::String(name.clone()));
                out.extend(self.read_fields(fields)?);
                Value::Object(out)
            }
        })
    }

    fn read_fields(&mut self, fields: &[FieldLayout]) -> Result<Map<String, Value>, BcsError> {
        let mut out = Map::new();
        for (name, layout) in fields {
            out.insert(name.clone(), self.read(layout)?);
        }
        Ok(out)
    }
}

/// Decode a complete buffer; leftover bytes are an error.
pub fn read_value(layout: &BinaryLayout, bytes: &[u8]) -> Result<Value, BcsError> {
    let mut reader = BcsReader::new(bytes);
    let value = reader.read(layout)?;
    if reader.remaining() > 0 {
        return Err(BcsError::TrailingBytes {
            type_: layout.name(),
            remaining: reader.remaining(),
        });
    }
    Ok(value)
}
