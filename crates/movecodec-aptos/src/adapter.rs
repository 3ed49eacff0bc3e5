//! `ChainAdapter` for Aptos.

use crate::translate;
use indexmap::IndexMap;
use movecodec_core::{
    ChainAdapter, ChainFamily, InternalMoveModule, InternalMoveStruct,
    RawModule, TranslateError, TypeDescriptor,
};
use serde_json::Value;

/// Handle type whose first type argument names an event struct.
pub const EVENT_HANDLE: &str = "0x1::event::EventHandle";

/// Coin events superseded by module events; never reported.
const DEPRECATED_EVENTS: &[&str] = &["0x1::coin::Deposit", "0x1::coin::Withdraw"];

#[derive(Debug, Clone, Copy, Default)]
pub struct AptosChainAdapter;

impl ChainAdapter for AptosChainAdapter {
    fn chain_family(&self) -> ChainFamily {
        ChainFamily::Aptos
    }

    fn to_internal_modules(
        &self,
        raw: &[RawModule],
    ) -> Result<Vec<InternalMoveModule>, TranslateError> {
        translate::to_internal_modules(raw)
    }

    /// The leading signer is supplied by the transaction, not the payload.
    fn meaningful_function_params(&self, params: &[TypeDescriptor]) -> Vec<TypeDescriptor> {
        match params.first() {
            Some(first) if first.qname.eq_ignore_ascii_case("signer") => params[1..].to_vec(),
            _ => params.to_vec(),
        }
    }

    fn get_type(&self, value: &Value) -> Option<String> {
        value.get("type").and_then(Value::as_str).map(str::to_string)
    }

    fn get_data<'a>(&self, value: &'a Value) -> &'a Value {
        match (value.get("data"), value.get("type")) {
            (Some(data), Some(_)) => data,
            _ => value,
        }
    }

    fn event_structs(&self, modules: &[InternalMoveModule]) -> IndexMap<String, InternalMoveStruct> {
        let mut events = IndexMap::new();
        let mut structs = IndexMap::new();
        for module in modules {
            for s in &module.structs {
                let type_name = module.member_qname(&s.name);
                if DEPRECATED_EVENTS.contains(&type_name.as_str()) {
                    continue;
                }
                if s.is_event {
                    events.insert(type_name.clone(), s.clone());
                }
                structs.insert(type_name, s.clone());
            }
        }

        for module in modules {
            for s in &module.structs {
                for field in &s.fields {
                    if field.type_.qname != EVENT_HANDLE {
                        continue;
                    }
                    let Some(target) = field.type_.type_args.first() else {
                        continue;
                    };
                    if let Some(event) = structs.get(&target.qname) {
                        events.insert(target.qname.clone(), event.clone());
                    }
                }
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn modules() -> Vec<InternalMoveModule> {
        let raw = json!([{
            "abi": {
                "address": "0x1",
                "name": "coin",
                "structs": [
                    {
                        "name": "CoinStore",
                        "generic_type_params": [{"constraints": []}],
                        "fields": [
                            {"name": "deposit_events", "type": "0x1::event::EventHandle<0x1::coin::DepositEvent>"},
                            {"name": "withdraw_events", "type": "0x1::event::EventHandle<0x1::coin::WithdrawEvent>"}
                        ]
                    },
                    {"name": "DepositEvent", "abilities": ["drop", "store"], "fields": [{"name": "amount", "type": "u64"}]},
                    {"name": "WithdrawEvent", "abilities": ["drop", "store"], "fields": [{"name": "amount", "type": "u64"}]},
                    {"name": "Deposit", "is_event": true, "fields": [{"name": "amount", "type": "u64"}]},
                    {"name": "CoinRegister", "is_event": true, "fields": [{"name": "account", "type": "address"}]},
                    {"name": "Plain", "abilities": ["drop", "store"], "fields": [{"name": "x", "type": "u8"}]}
                ]
            }
        }]);
        AptosChainAdapter
            .to_internal_modules(raw.as_array().unwrap())
            .unwrap()
    }

    #[test]
    fn events_from_flags_and_handles() {
        let events = AptosChainAdapter.event_structs(&modules());
        let names: Vec<&str> = events.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["0x1::coin::CoinRegister", "0x1::coin::DepositEvent", "0x1::coin::WithdrawEvent"]
        );
    }

    #[test]
    fn strips_leading_signer() {
        let params: Vec<TypeDescriptor> = ["&signer", "u64", "address"]
            .iter()
            .map(|s| TypeDescriptor::parse(s).unwrap())
            .collect();
        let meaningful = AptosChainAdapter.meaningful_function_params(&params);
        assert_eq!(meaningful.len(), 2);
        assert_eq!(meaningful[0].qname, "u64");

        let no_signer = &params[1..];
        assert_eq!(AptosChainAdapter.meaningful_function_params(no_signer).len(), 2);
    }

    #[test]
    fn resource_data_unwrapping() {
        let resource = json!({"type": "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>", "data": {"frozen": false}});
        assert_eq!(AptosChainAdapter.get_data(&resource), &json!({"frozen": false}));
        assert_eq!(
            AptosChainAdapter.get_type(&resource).as_deref(),
            Some("0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>")
        );
    }
}
