//! Aptos REST ABI → normalized module model.

use crate::abi::{MoveFunctionAbi, MoveModuleAbi, MoveModuleBytecode, MoveStructAbi};
use movecodec_core::{
    parse_move_type, InternalMoveField, InternalMoveFunction, InternalMoveFunctionVisibility,
    InternalMoveModule, InternalMoveStruct, InternalMoveTypeParam, RawModule, TranslateError,
    TypeDescriptor,
};
use serde_json::Value;

fn parse_types(types: &[String]) -> Result<Vec<TypeDescriptor>, TranslateError> {
    types
        .iter()
        .map(|t| parse_move_type(t).map_err(TranslateError::from))
        .collect()
}

fn visibility(name: &str, raw: &str) -> Result<InternalMoveFunctionVisibility, TranslateError> {
    match raw.to_ascii_lowercase().as_str() {
        "public" => Ok(InternalMoveFunctionVisibility::Public),
        "private" => Ok(InternalMoveFunctionVisibility::Private),
        "friend" => Ok(InternalMoveFunctionVisibility::Friend),
        other => Err(TranslateError::Invalid {
            context: format!("function {name}"),
            reason: format!("unknown visibility '{other}'"),
        }),
    }
}

pub fn to_internal_function(func: &MoveFunctionAbi) -> Result<InternalMoveFunction, TranslateError> {
    Ok(InternalMoveFunction {
        name: func.name.clone(),
        visibility: visibility(&func.name, &func.visibility)?,
        is_entry: func.is_entry,
        is_view: func.is_view,
        type_params: func
            .generic_type_params
            .iter()
            .map(|p| InternalMoveTypeParam {
                constraints: p.constraints.clone(),
            })
            .collect(),
        params: parse_types(&func.params)?,
        returns: parse_types(&func.returns)?,
    })
}

pub fn to_internal_struct(s: &MoveStructAbi) -> Result<InternalMoveStruct, TranslateError> {
    let fields = s
        .fields
        .iter()
        .map(|f| -> Result<InternalMoveField, TranslateError> {
            Ok(InternalMoveField {
                name: f.name.clone(),
                type_: parse_move_type(&f.type_)?,
            })
        })
        .collect::<Result<Vec<_>, TranslateError>>()?;
    Ok(InternalMoveStruct {
        name: s.name.clone(),
        abilities: s.abilities.clone(),
        type_params: s
            .generic_type_params
            .iter()
            .map(|p| InternalMoveTypeParam {
                constraints: p.constraints.clone(),
            })
            .collect(),
        fields,
        is_native: s.is_native,
        is_event: s.is_event,
    })
}

pub fn to_internal_module(abi: &MoveModuleAbi) -> Result<InternalMoveModule, TranslateError> {
    Ok(InternalMoveModule {
        address: abi.address.clone(),
        name: abi.name.clone(),
        structs: abi
            .structs
            .iter()
            .map(to_internal_struct)
            .collect::<Result<_, _>>()?,
        functions: abi
            .exposed_functions
            .iter()
            .map(to_internal_function)
            .collect::<Result<_, _>>()?,
        enums: Vec::new(),
    })
}

/// Parse one raw module: either `{bytecode, abi}` or a bare ABI object.
///
/// Returns `Ok(None)` for bytecode-only modules.
pub fn parse_raw_module(raw: &RawModule) -> Result<Option<MoveModuleAbi>, TranslateError> {
    let invalid = |e: serde_json::Error| TranslateError::Invalid {
        context: "aptos module".into(),
        reason: e.to_string(),
    };
    if raw.get("abi").is_some() || raw.get("bytecode").is_some() {
        let module: MoveModuleBytecode = serde_json::from_value(raw.clone()).map_err(invalid)?;
        return Ok(module.abi);
    }
    if raw.get("exposed_functions").is_some() || raw.get("structs").is_some() {
        return serde_json::from_value(raw.clone()).map(Some).map_err(invalid);
    }
    match raw {
        Value::Object(_) => Err(TranslateError::MissingAbi),
        other => Err(TranslateError::Invalid {
            context: "aptos module".into(),
            reason: format!("expected object, got {other}"),
        }),
    }
}

/// Translate raw modules, skipping those published without an ABI.
pub fn to_internal_modules(raw: &[RawModule]) -> Result<Vec<InternalMoveModule>, TranslateError> {
    let mut out = Vec::with_capacity(raw.len());
    for module in raw {
        if let Some(abi) = parse_raw_module(module)? {
            out.push(to_internal_module(&abi)?);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coin_module() -> Value {
        json!({
            "bytecode": "0xa11ceb0b",
            "abi": {
                "address": "0x1",
                "name": "coin",
                "friends": ["0x1::aptos_coin"],
                "exposed_functions": [{
                    "name": "transfer",
                    "visibility": "public",
                    "is_entry": true,
                    "is_view": false,
                    "generic_type_params": [{"constraints": []}],
                    "params": ["&signer", "address", "u64"],
                    "return": []
                }],
                "structs": [{
                    "name": "Coin",
                    "is_native": false,
                    "abilities": ["store"],
                    "generic_type_params": [{"constraints": []}],
                    "fields": [{"name": "value", "type": "u64"}]
                }]
            }
        })
    }

    #[test]
    fn translates_rest_module() {
        let modules = to_internal_modules(&[coin_module()]).unwrap();
        assert_eq!(modules.len(), 1);
        let coin = &modules[0];
        assert_eq!(coin.qname(), "0x1::coin");
        let transfer = coin.find_function("transfer").unwrap();
        assert!(transfer.is_entry);
        assert!(transfer.params[0].reference);
        assert_eq!(transfer.params[0].qname, "signer");
        assert_eq!(coin.find_struct("Coin").unwrap().type_params.len(), 1);
    }

    #[test]
    fn skips_modules_without_abi_and_accepts_bare_abi() {
        let bare = coin_module()["abi"].clone();
        let modules =
            to_internal_modules(&[json!({"bytecode": "0x00"}), bare]).unwrap();
        assert_eq!(modules.len(), 1);
        assert!(matches!(
            to_internal_modules(&[json!({"something": 1})]),
            Err(TranslateError::MissingAbi)
        ));
    }

    #[test]
    fn bad_type_signature_is_reported() {
        let mut module = coin_module();
        module["abi"]["structs"][0]["fields"][0]["type"] = json!("vector<u8");
        assert!(matches!(
            to_internal_modules(&[module]),
            Err(TranslateError::TypeParse(_))
        ));
    }
}
