//! Sui normalized modules (`sui_getNormalizedMoveModulesByPackage`) →
//! normalized module model.

use indexmap::IndexMap;
use movecodec_core::{
    InternalMoveEnum, InternalMoveField, InternalMoveFunction, InternalMoveFunctionVisibility,
    InternalMoveModule, InternalMoveStruct, InternalMoveTypeParam, RawModule, TranslateError,
    TypeDescriptor, SPLITTER,
};
use serde_json::{Map, Value};

fn invalid(context: &str, reason: impl Into<String>) -> TranslateError {
    TranslateError::Invalid {
        context: context.to_string(),
        reason: reason.into(),
    }
}

fn field<'a>(obj: &'a Map<String, Value>, name: &str, context: &str) -> Result<&'a Value, TranslateError> {
    obj.get(name).ok_or_else(|| TranslateError::MissingField {
        field: name.to_string(),
        context: context.to_string(),
    })
}

fn str_field<'a>(obj: &'a Map<String, Value>, name: &str, context: &str) -> Result<&'a str, TranslateError> {
    field(obj, name, context)?
        .as_str()
        .ok_or_else(|| invalid(context, format!("'{name}' is not a string")))
}

/// `["Copy", "Drop"]`, `{abilities: [...]}` or `{constraints: {abilities: [...]}}`, lowercased.
fn abilities(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_ascii_lowercase)
            .collect(),
        Value::Object(obj) => obj
            .get("abilities")
            .or_else(|| obj.get("constraints"))
            .map(abilities)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn type_params(value: Option<&Value>) -> Vec<InternalMoveTypeParam> {
    value
        .and_then(Value::as_array)
        .map(|params| {
            params
                .iter()
                .map(|p| InternalMoveTypeParam {
                    constraints: abilities(p),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// One normalized type node.
pub fn to_type_descriptor(value: &Value) -> Result<TypeDescriptor, TranslateError> {
    if let Some(primitive) = value.as_str() {
        return match primitive {
            "Bool" | "U8" | "U16" | "U32" | "U64" | "U128" | "U256" | "Address" | "Signer" => {
                Ok(TypeDescriptor::new(primitive.to_ascii_lowercase()))
            }
            other => Err(invalid("sui type", format!("unknown primitive '{other}'"))),
        };
    }
    let obj = value
        .as_object()
        .filter(|o| o.len() == 1)
        .ok_or_else(|| invalid("sui type", format!("expected single-key object, got {value}")))?;
    let Some((kind, inner)) = obj.iter().next() else {
        return Err(invalid("sui type", "empty type object"));
    };
    match kind.as_str() {
        "Vector" => Ok(TypeDescriptor::vector(to_type_descriptor(inner)?)),
        "TypeParameter" => inner
            .as_u64()
            .map(|idx| TypeDescriptor::new(format!("T{idx}")))
            .ok_or_else(|| invalid("sui type", format!("type parameter index {inner}"))),
        "Reference" | "MutableReference" => {
            let mut ty = to_type_descriptor(inner)?;
            ty.reference = true;
            ty.mutable = kind == "MutableReference";
            Ok(ty)
        }
        // newer nodes name structs and enums alike `Datatype`
        "Struct" | "Datatype" => {
            let s = inner
                .as_object()
                .ok_or_else(|| invalid("sui struct type", "payload is not an object"))?;
            let qname = [
                str_field(s, "address", "sui struct type")?,
                str_field(s, "module", "sui struct type")?,
                str_field(s, "name", "sui struct type")?,
            ]
            .join(SPLITTER);
            let args = match s.get("typeArguments").and_then(Value::as_array) {
                Some(args) => args.iter().map(to_type_descriptor).collect::<Result<_, _>>()?,
                None => Vec::new(),
            };
            // qualified names go through the parser so the address is canonical
            let mut ty = TypeDescriptor::parse(&qname)?;
            ty.type_args = args;
            Ok(ty)
        }
        other => Err(invalid("sui type", format!("unknown kind '{other}'"))),
    }
}

fn to_fields(value: Option<&Value>, context: &str) -> Result<Vec<InternalMoveField>, TranslateError> {
    let Some(items) = value else {
        return Ok(Vec::new());
    };
    let items = items
        .as_array()
        .ok_or_else(|| invalid(context, "fields are not an array"))?;
    items
        .iter()
        .map(|f| {
            let obj = f
                .as_object()
                .ok_or_else(|| invalid(context, "field is not an object"))?;
            Ok(InternalMoveField {
                name: str_field(obj, "name", context)?.to_string(),
                type_: to_type_descriptor(field(obj, "type", context)?)?,
            })
        })
        .collect()
}

fn visibility(name: &str, raw: &str) -> Result<InternalMoveFunctionVisibility, TranslateError> {
    match raw {
        "Public" => Ok(InternalMoveFunctionVisibility::Public),
        "Private" => Ok(InternalMoveFunctionVisibility::Private),
        "Friend" => Ok(InternalMoveFunctionVisibility::Friend),
        other => Err(invalid(&format!("function {name}"), format!("no visibility '{other}'"))),
    }
}

fn to_internal_function(name: &str, func: &Value) -> Result<InternalMoveFunction, TranslateError> {
    let context = format!("function {name}");
    let obj = func
        .as_object()
        .ok_or_else(|| invalid(&context, "not an object"))?;
    let types = |key: &str| -> Result<Vec<TypeDescriptor>, TranslateError> {
        field(obj, key, &context)?
            .as_array()
            .ok_or_else(|| invalid(&context, format!("'{key}' is not an array")))?
            .iter()
            .map(to_type_descriptor)
            .collect()
    };
    Ok(InternalMoveFunction {
        name: name.to_string(),
        visibility: visibility(name, str_field(obj, "visibility", &context)?)?,
        is_entry: obj.get("isEntry").and_then(Value::as_bool).unwrap_or(false),
        is_view: false,
        type_params: type_params(obj.get("typeParameters")),
        params: types("parameters")?,
        returns: types("return")?,
    })
}

fn to_internal_struct(name: &str, s: &Value) -> Result<InternalMoveStruct, TranslateError> {
    let context = format!("struct {name}");
    let obj = s.as_object().ok_or_else(|| invalid(&context, "not an object"))?;
    Ok(InternalMoveStruct {
        name: name.to_string(),
        abilities: obj.get("abilities").map(abilities).unwrap_or_default(),
        type_params: type_params(obj.get("typeParameters")),
        fields: to_fields(obj.get("fields"), &context)?,
        is_native: false,
        is_event: false,
    })
}

fn to_internal_enum(name: &str, e: &Value) -> Result<InternalMoveEnum, TranslateError> {
    let context = format!("enum {name}");
    let obj = e.as_object().ok_or_else(|| invalid(&context, "not an object"))?;
    let variants = field(obj, "variants", &context)?
        .as_object()
        .ok_or_else(|| invalid(&context, "variants are not an object"))?;

    // declaration order decides the BCS tag; fall back to map order
    let order: Vec<String> = match obj.get("variantDeclarationOrder").and_then(Value::as_array) {
        Some(names) => names.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        None => variants.keys().cloned().collect(),
    };
    let mut out = IndexMap::with_capacity(order.len());
    for variant in order {
        let fields = to_fields(variants.get(&variant), &context)?;
        out.insert(variant, fields);
    }
    Ok(InternalMoveEnum {
        name: name.to_string(),
        abilities: obj.get("abilities").map(abilities).unwrap_or_default(),
        type_params: type_params(obj.get("typeParameters")),
        variants: out,
    })
}

fn named_entries<'a>(obj: &'a Map<String, Value>, key: &str) -> Vec<(&'a String, &'a Value)> {
    obj.get(key)
        .and_then(Value::as_object)
        .map(|m| m.iter().collect())
        .unwrap_or_default()
}

pub fn to_internal_module(module: &Value) -> Result<InternalMoveModule, TranslateError> {
    let obj = module
        .as_object()
        .ok_or_else(|| invalid("sui module", "not an object"))?;
    let address = str_field(obj, "address", "sui module")?.to_string();
    let name = str_field(obj, "name", "sui module")?.to_string();
    Ok(InternalMoveModule {
        structs: named_entries(obj, "structs")
            .into_iter()
            .map(|(n, s)| to_internal_struct(n, s))
            .collect::<Result<_, _>>()?,
        functions: named_entries(obj, "exposedFunctions")
            .into_iter()
            .map(|(n, f)| to_internal_function(n, f))
            .collect::<Result<_, _>>()?,
        enums: named_entries(obj, "enums")
            .into_iter()
            .map(|(n, e)| to_internal_enum(n, e))
            .collect::<Result<_, _>>()?,
        address,
        name,
    })
}

fn is_module(value: &Value) -> bool {
    value.get("address").is_some() && value.get("name").is_some()
}

/// Translate raw modules. A package map (`{module_name: module}`), as
/// returned by the by-package call, is flattened first.
pub fn to_internal_modules(raw: &[RawModule]) -> Result<Vec<InternalMoveModule>, TranslateError> {
    let mut out = Vec::new();
    for value in raw {
        if is_module(value) {
            out.push(to_internal_module(value)?);
            continue;
        }
        let package = value.as_object().ok_or(TranslateError::MissingAbi)?;
        if package.is_empty() || !package.values().all(is_module) {
            return Err(TranslateError::MissingAbi);
        }
        for module in package.values() {
            out.push(to_internal_module(module)?);
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
            "fileFormatVersion": 6,
            "address": "0x0000000000000000000000000000000000000000000000000000000000000002",
            "name": "coin",
            "friends": [],
            "structs": {
                "Coin": {
                    "abilities": {"abilities": ["Store", "Key"]},
                    "typeParameters": [{"constraints": {"abilities": []}, "isPhantom": true}],
                    "fields": [
                        {"name": "id", "type": {"Struct": {"address": "0x2", "module": "object", "name": "UID", "typeArguments": []}}},
                        {"name": "balance", "type": {"Struct": {"address": "0x2", "module": "balance", "name": "Balance", "typeArguments": [{"TypeParameter": 0}]}}}
                    ]
                }
            },
            "exposedFunctions": {
                "split": {
                    "visibility": "Public",
                    "isEntry": false,
                    "typeParameters": [{"abilities": []}],
                    "parameters": [
                        {"MutableReference": {"Struct": {"address": "0x2", "module": "coin", "name": "Coin", "typeArguments": [{"TypeParameter": 0}]}}},
                        "U64",
                        {"MutableReference": {"Struct": {"address": "0x2", "module": "tx_context", "name": "TxContext", "typeArguments": []}}}
                    ],
                    "return": [{"Struct": {"address": "0x2", "module": "coin", "name": "Coin", "typeArguments": [{"TypeParameter": 0}]}}]
                }
            }
        })
    }

    #[test]
    fn translates_normalized_module() {
        let modules = to_internal_modules(&[coin_module()]).unwrap();
        let coin = &modules[0];
        assert_eq!(coin.qname(), "0x2::coin");

        let s = coin.find_struct("Coin").unwrap();
        assert_eq!(s.abilities, vec!["store", "key"]);
        assert_eq!(s.fields[1].type_.signature(), "0x2::balance::Balance<T0>");

        let split = coin.find_function("split").unwrap();
        assert!(split.params[0].reference && split.params[0].mutable);
        assert_eq!(split.params[1].qname, "u64");
        assert_eq!(split.returns[0].signature(), "0x2::coin::Coin<T0>");
    }

    #[test]
    fn flattens_package_map() {
        let package = json!({"coin": coin_module()});
        assert_eq!(to_internal_modules(&[package]).unwrap().len(), 1);
        assert!(matches!(
            to_internal_modules(&[json!({"coin": 1})]),
            Err(TranslateError::MissingAbi)
        ));
    }

    #[test]
    fn enums_keep_declaration_order() {
        let module = json!({
            "address": "0x7",
            "name": "order",
            "enums": {
                "Side": {
                    "abilities": {"abilities": ["Copy", "Drop", "Store"]},
                    "typeParameters": [],
                    "variants": {
                        "Sell": [{"name": "price", "type": "U64"}],
                        "Buy": [{"name": "price", "type": "U64"}]
                    },
                    "variantDeclarationOrder": ["Buy", "Sell"]
                }
            }
        });
        let modules = to_internal_modules(&[module]).unwrap();
        let side = &modules[0].enums[0];
        let names: Vec<&String> = side.variants.keys().collect();
        assert_eq!(names, vec!["Buy", "Sell"]);
    }

    #[test]
    fn rejects_unknown_primitive() {
        assert!(to_type_descriptor(&json!("U512")).is_err());
    }
}
