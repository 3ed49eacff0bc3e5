//! `ChainAdapter` for Sui.

use crate::translate;
use indexmap::IndexMap;
use movecodec_core::{
    parse_big_int, ChainAdapter, ChainFamily, InternalMoveModule, InternalMoveStruct, RawModule,
    TranslateError, TypeDescriptor, U256,
};
use serde_json::Value;

pub const TX_CONTEXT: &str = "0x2::tx_context::TxContext";

#[derive(Debug, Clone, Copy, Default)]
pub struct SuiChainAdapter;

impl ChainAdapter for SuiChainAdapter {
    fn chain_family(&self) -> ChainFamily {
        ChainFamily::Sui
    }

    fn to_internal_modules(
        &self,
        raw: &[RawModule],
    ) -> Result<Vec<InternalMoveModule>, TranslateError> {
        translate::to_internal_modules(raw)
    }

    /// The trailing `TxContext` is injected by the runtime.
    fn meaningful_function_params(&self, params: &[TypeDescriptor]) -> Vec<TypeDescriptor> {
        match params.split_last() {
            Some((last, rest)) if last.reference && last.qname == TX_CONTEXT => rest.to_vec(),
            _ => params.to_vec(),
        }
    }

    fn get_type(&self, value: &Value) -> Option<String> {
        value.get("type").and_then(Value::as_str).map(str::to_string)
    }

    /// Event `parsedJson`, object `fields`, or the value itself.
    fn get_data<'a>(&self, value: &'a Value) -> &'a Value {
        if let Some(parsed) = value.get("parsedJson") {
            return parsed;
        }
        if value.get("dataType").and_then(Value::as_str) == Some("moveObject") {
            if let Some(fields) = value.get("fields") {
                return fields;
            }
        }
        match (value.get("fields"), value.get("type"), value.as_object()) {
            (Some(fields), Some(_), Some(obj)) if obj.len() == 2 => fields,
            _ => value,
        }
    }

    /// Structs with both `copy` and `drop` can be emitted as events.
    fn event_structs(&self, modules: &[InternalMoveModule]) -> IndexMap<String, InternalMoveStruct> {
        modules
            .iter()
            .flat_map(|m| {
                m.structs
                    .iter()
                    .filter(|s| s.has_ability("copy") && s.has_ability("drop"))
                    .map(move |s| (m.member_qname(&s.name), s.clone()))
            })
            .collect()
    }

    /// Decimal strings, numbers, or little-endian byte arrays.
    fn decode_big_int(&self, value: &Value) -> Option<U256> {
        match value {
            Value::Array(items) if !items.is_empty() && items.len() <= 32 => {
                let mut bytes = [0u8; 32];
                for (slot, item) in bytes.iter_mut().zip(items) {
                    *slot = u8::try_from(item.as_u64()?).ok()?;
                }
                Some(U256::from_le_bytes(bytes))
            }
            other => parse_big_int(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drops_trailing_tx_context() {
        let params: Vec<TypeDescriptor> = ["&mut 0x2::coin::Coin<T0>", "u64", "&mut 0x2::tx_context::TxContext"]
            .iter()
            .map(|s| TypeDescriptor::parse(s).unwrap())
            .collect();
        assert_eq!(SuiChainAdapter.meaningful_function_params(&params).len(), 2);
        assert_eq!(SuiChainAdapter.meaningful_function_params(&params[..2]).len(), 2);
    }

    #[test]
    fn data_envelopes() {
        let event = json!({"type": "0x2::m::E", "parsedJson": {"a": 1}, "sender": "0x1"});
        assert_eq!(SuiChainAdapter.get_data(&event), &json!({"a": 1}));

        let object = json!({"dataType": "moveObject", "type": "0x2::m::O", "hasPublicTransfer": true, "fields": {"b": 2}});
        assert_eq!(SuiChainAdapter.get_data(&object), &json!({"b": 2}));

        let nested = json!({"type": "0x2::m::N", "fields": {"c": 3}});
        assert_eq!(SuiChainAdapter.get_data(&nested), &json!({"c": 3}));

        let plain = json!({"type": "x", "fields": {}, "extra": 0});
        assert_eq!(SuiChainAdapter.get_data(&plain), &plain);
    }

    #[test]
    fn little_endian_byte_integers() {
        assert_eq!(
            SuiChainAdapter.decode_big_int(&json!([1, 1, 0, 0, 0, 0, 0, 0])),
            Some(U256::from(257u64))
        );
        assert_eq!(SuiChainAdapter.decode_big_int(&json!("257")), Some(U256::from(257u64)));
        assert_eq!(SuiChainAdapter.decode_big_int(&json!([256])), None);
    }
}
