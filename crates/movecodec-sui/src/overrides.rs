//! Sui framework types whose JSON or BCS form differs from their struct layout.
//!
//! Node JSON renders most of these as plain strings; BCS output keeps the
//! struct shape (`{bytes: [...]}`, `{vec: [...]}`), which is unwrapped here
//! after generic decoding.

use movecodec_coder::{OverrideAction, StringPassthrough, ValueOverride};
use movecodec_core::{
    account_address_string, parse_big_int, DecodeError, MoveValue, TypeDescriptor, U256,
};
use serde_json::Value;
use std::sync::Arc;

pub const ASCII_CHAR: &str = "0x1::ascii::Char";
pub const ASCII_STRING: &str = "0x1::ascii::String";
pub const UTF8_STRING: &str = "0x1::string::String";
pub const OPTION: &str = "0x1::option::Option";
pub const OBJECT_ID: &str = "0x2::object::ID";
pub const OBJECT_UID: &str = "0x2::object::UID";
pub const URL: &str = "0x2::url::Url";
pub const COIN: &str = "0x2::coin::Coin";
pub const BALANCE: &str = "0x2::balance::Balance";

/// Every Sui override, ready for `MoveCoder::with_overrides`.
pub fn sui_overrides() -> Vec<Arc<dyn ValueOverride>> {
    vec![
        Arc::new(Unwrap::new(ASCII_CHAR, "byte", Unwrapped::Char)),
        Arc::new(Unwrap::new(ASCII_STRING, "bytes", Unwrapped::Utf8)),
        Arc::new(Unwrap::new(OBJECT_ID, "bytes", Unwrapped::Address)),
        Arc::new(Unwrap::new(OBJECT_UID, "id", Unwrapped::AsIs)),
        Arc::new(Unwrap::new(URL, "url", Unwrapped::AsIs)),
        Arc::new(StringPassthrough::new(COIN)),
        Arc::new(Utf8String),
        Arc::new(OptionOverride),
        Arc::new(BalanceOverride),
        Arc::new(AddressOverride),
    ]
}

/// Raw bytes of a decoded `vector<u8>`: a number array or a hex string.
fn bytes_of(value: &MoveValue) -> Option<Vec<u8>> {
    match value {
        MoveValue::Json(Value::Array(items)) => items
            .iter()
            .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect(),
        MoveValue::Vector(items) => items
            .iter()
            .map(|b| match b {
                MoveValue::Number(n) => u8::try_from(*n).ok(),
                _ => None,
            })
            .collect(),
        MoveValue::String(s) => {
            let digits = s.strip_prefix("0x")?;
            hex::decode(digits).ok()
        }
        _ => None,
    }
}

fn utf8(bytes: Vec<u8>, ty: &TypeDescriptor) -> Result<MoveValue, DecodeError> {
    String::from_utf8(bytes)
        .map(MoveValue::String)
        .map_err(|e| DecodeError::TypeMismatch {
            expected: ty.signature(),
            got: format!("invalid UTF-8 ({e})"),
        })
}

fn normalized_address(raw: &str, ty: &TypeDescriptor) -> Result<MoveValue, DecodeError> {
    account_address_string(raw)
        .map(MoveValue::String)
        .map_err(|_| DecodeError::TypeMismatch {
            expected: ty.signature(),
            got: raw.to_string(),
        })
}

#[derive(Debug, Clone, Copy)]
enum Unwrapped {
    Char,
    Utf8,
    Address,
    AsIs,
}

/// String in JSON; single-field struct in BCS, reduced to that field.
#[derive(Debug, Clone)]
struct Unwrap {
    qname: &'static str,
    field: &'static str,
    kind: Unwrapped,
}

impl Unwrap {
    fn new(qname: &'static str, field: &'static str, kind: Unwrapped) -> Self {
        Self { qname, field, kind }
    }
}

impl ValueOverride for Unwrap {
    fn qname(&self) -> &str {
        self.qname
    }

    fn decode(&self, data: &Value, ty: &TypeDescriptor) -> Result<OverrideAction, DecodeError> {
        Ok(match data {
            Value::Null => OverrideAction::Resolved(MoveValue::Null),
            Value::String(s) => match self.kind {
                Unwrapped::Address => OverrideAction::Resolved(normalized_address(s, ty)?),
                _ => OverrideAction::Resolved(MoveValue::String(s.clone())),
            },
            _ => OverrideAction::Generic,
        })
    }

    fn finish(&self, decoded: MoveValue, ty: &TypeDescriptor) -> Result<MoveValue, DecodeError> {
        let inner = decoded
            .field(self.field)
            .cloned()
            .ok_or_else(|| DecodeError::MissingField {
                field: self.field.to_string(),
                type_: ty.signature(),
            })?;
        let mismatch = || DecodeError::TypeMismatch {
            expected: ty.signature(),
            got: inner.to_string(),
        };
        match self.kind {
            Unwrapped::Char => {
                let byte = inner
                    .as_big_int()
                    .filter(|b| *b <= U256::from(u8::MAX))
                    .ok_or_else(mismatch)?;
                Ok(MoveValue::String(char::from(byte.to::<u8>()).to_string()))
            }
            Unwrapped::Utf8 => utf8(bytes_of(&inner).ok_or_else(mismatch)?, ty),
            Unwrapped::Address => normalized_address(inner.as_str().ok_or_else(mismatch)?, ty),
            Unwrapped::AsIs => Ok(inner),
        }
    }
}

/// `0x1::string::String`: JSON string or BCS `{bytes}`.
#[derive(Debug, Clone, Copy)]
struct Utf8String;

impl ValueOverride for Utf8String {
    fn qname(&self) -> &str {
        UTF8_STRING
    }

    fn decode(&self, data: &Value, ty: &TypeDescriptor) -> Result<OverrideAction, DecodeError> {
        match data.get("bytes") {
            Some(bytes) => {
                let bytes = bytes_of(&MoveValue::Json(bytes.clone())).ok_or_else(|| {
                    DecodeError::TypeMismatch {
                        expected: ty.signature(),
                        got: bytes.to_string(),
                    }
                })?;
                Ok(OverrideAction::Resolved(utf8(bytes, ty)?))
            }
            None => Ok(OverrideAction::Generic),
        }
    }
}

/// `Option<T>`: `null`, the bare inner value, or BCS `{vec: [..]}`.
#[derive(Debug, Clone, Copy)]
struct OptionOverride;

impl ValueOverride for OptionOverride {
    fn qname(&self) -> &str {
        OPTION
    }

    fn decode(&self, data: &Value, ty: &TypeDescriptor) -> Result<OverrideAction, DecodeError> {
        if data.is_null() {
            return Ok(OverrideAction::Resolved(MoveValue::Null));
        }
        if data.get("vec").is_some() {
            return Ok(OverrideAction::Generic);
        }
        let inner = ty.type_args.first().cloned().ok_or_else(|| DecodeError::TypeMismatch {
            expected: "0x1::option::Option<T>".into(),
            got: ty.signature(),
        })?;
        Ok(OverrideAction::Redirect {
            data: data.clone(),
            ty: inner,
        })
    }

    fn finish(&self, decoded: MoveValue, _ty: &TypeDescriptor) -> Result<MoveValue, DecodeError> {
        Ok(decoded
            .field("vec")
            .and_then(MoveValue::as_vector)
            .and_then(|items| items.first().cloned())
            .unwrap_or(MoveValue::Null))
    }
}

/// `Balance<T>`: a bare integer in JSON, `{value}` in BCS.
#[derive(Debug, Clone, Copy)]
struct BalanceOverride;

impl ValueOverride for BalanceOverride {
    fn qname(&self) -> &str {
        BALANCE
    }

    fn decode(&self, data: &Value, ty: &TypeDescriptor) -> Result<OverrideAction, DecodeError> {
        if data.get("value").is_some() {
            return Ok(OverrideAction::Generic);
        }
        parse_big_int(data)
            .map(|v| OverrideAction::Resolved(MoveValue::BigInt(v)))
            .ok_or_else(|| DecodeError::InvalidInteger {
                value: data.to_string(),
                type_: ty.signature(),
            })
    }

    fn finish(&self, decoded: MoveValue, ty: &TypeDescriptor) -> Result<MoveValue, DecodeError> {
        decoded.field("value").cloned().ok_or_else(|| DecodeError::MissingField {
            field: "value".into(),
            type_: ty.signature(),
        })
    }
}

/// Addresses are always reported in full 32-byte form.
#[derive(Debug, Clone, Copy)]
struct AddressOverride;

impl ValueOverride for AddressOverride {
    fn qname(&self) -> &str {
        "address"
    }

    fn decode(&self, data: &Value, ty: &TypeDescriptor) -> Result<OverrideAction, DecodeError> {
        match data {
            Value::String(s) => Ok(OverrideAction::Resolved(normalized_address(s, ty)?)),
            Value::Null => Ok(OverrideAction::Resolved(MoveValue::Null)),
            other => Err(DecodeError::TypeMismatch {
                expected: ty.signature(),
                got: other.to_string(),
            }),
        }
    }
}
