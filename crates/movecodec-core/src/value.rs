//! Host-side representation of decoded Move values.

use alloy_primitives::U256;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// A value decoded against a Move type.
///
/// `u8`/`u16`/`u32` land in [`MoveValue::Number`]; `u64` and wider always
/// become [`MoveValue::BigInt`] regardless of magnitude.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveValue {
    Null,
    Bool(bool),
    Number(u64),
    BigInt(U256),
    /// Addresses, strings, and `vector<u8>` blobs.
    String(String),
    Vector(Vec<MoveValue>),
    /// Struct fields in declaration order.
    Struct(IndexMap<String, MoveValue>),
    /// Passed through without schema interpretation (references, enums).
    Json(Value),
}

impl MoveValue {
    pub fn as_big_int(&self) -> Option<U256> {
        match self {
            Self::BigInt(v) => Some(*v),
            Self::Number(n) => Some(U256::from(*n)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Field of a struct value.
    pub fn field(&self, name: &str) -> Option<&MoveValue> {
        match self {
            Self::Struct(fields) => fields.get(name),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[MoveValue]> {
        match self {
            Self::Vector(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Json(Value::Null))
    }

    /// Wire form: big integers become decimal strings, everything else maps
    /// to its natural JSON shape.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::from(*n),
            Self::BigInt(v) => Value::String(v.to_string()),
            Self::String(s) => Value::String(s.clone()),
            Self::Vector(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Struct(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
            Self::Json(v) => v.clone(),
        }
    }
}

impl From<U256> for MoveValue {
    fn from(v: U256) -> Self {
        Self::BigInt(v)
    }
}

impl From<&str> for MoveValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl Serialize for MoveValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for MoveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// Parse an unsigned integer from its JSON wire form: a JSON number or a
/// decimal string. `0x`-prefixed hex strings are accepted too.
pub fn parse_big_int(value: &Value) -> Option<U256> {
    match value {
        Value::Number(n) => n.as_u64().map(U256::from),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "0x" {
                return None;
            }
            if let Some(hex) = s.strip_prefix("0x") {
                U256::from_str_radix(hex, 16).ok()
            } else {
                U256::from_str_radix(s, 10).ok()
            }
        }
        _ => None,
    }
}

/// A chain object (resource, event, Sui object) together with its decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedStruct {
    /// The original wire object.
    pub raw: Value,
    pub data_decoded: MoveValue,
    pub type_arguments: Vec<String>,
}

impl DecodedStruct {
    /// The raw object with `data_decoded` and `type_arguments` merged in.
    pub fn to_json(&self) -> Value {
        let mut out = match &self.raw {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                map.insert("raw".into(), other.clone());
                map
            }
        };
        out.insert("data_decoded".into(), self.data_decoded.to_json());
        out.insert(
            "type_arguments".into(),
            Value::Array(
                self.type_arguments
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect(),
            ),
        );
        Value::Object(out)
    }
}

impl Serialize for DecodedStruct {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
