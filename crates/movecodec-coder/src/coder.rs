//! `MoveCoder`: recursive, schema-driven conversion between chain wire
//! values and [`MoveValue`].
//!
//! Decoding walks the [`TypeDescriptor`] tree. Primitives are converted in
//! place, vectors element by element, and structs field by field after the
//! struct's own generic parameters are bound to the concrete type
//! arguments. Struct and enum definitions come from the registry, which
//! fetches missing accounts on demand.

use crate::overrides::{OverrideAction, OverrideSet, ValueOverride};
use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use movecodec_core::{
    match_type, parse_move_type, types::is_builtin, types::STRING_TYPE, ChainAdapter,
    DecodeError, DecodedStruct, InternalMoveFunction, InternalMoveStruct, MoveValue,
    TypeDescriptor, U256,
};
use movecodec_registry::ModuleRegistry;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

/// Largest value each integer keyword can hold.
fn integer_max(keyword: &str) -> Option<U256> {
    Some(match keyword {
        "u8" => U256::from(u8::MAX),
        "u16" => U256::from(u16::MAX),
        "u32" => U256::from(u32::MAX),
        "u64" => U256::from(u64::MAX),
        "u128" => U256::from(u128::MAX),
        "u256" => U256::MAX,
        _ => return None,
    })
}

/// JSON kind, for mismatch messages.
fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Scalar passthrough: JSON scalars become the matching `MoveValue`.
fn passthrough(data: &Value) -> MoveValue {
    match data {
        Value::Null => MoveValue::Null,
        Value::Bool(b) => MoveValue::Bool(*b),
        Value::String(s) => MoveValue::String(s.clone()),
        Value::Number(n) => match n.as_u64() {
            Some(n) => MoveValue::Number(n),
            None => MoveValue::Json(data.clone()),
        },
        other => MoveValue::Json(other.clone()),
    }
}

#[derive(Clone)]
pub struct MoveCoder {
    registry: ModuleRegistry,
    overrides: OverrideSet,
}

impl MoveCoder {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self {
            registry,
            overrides: OverrideSet::new(),
        }
    }

    /// Install a named-type override.
    pub fn with_override(mut self, ov: Arc<dyn ValueOverride>) -> Self {
        self.overrides.insert(ov);
        self
    }

    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = Arc<dyn ValueOverride>>) -> Self {
        for ov in overrides {
            self.overrides.insert(ov);
        }
        self
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn adapter(&self) -> &Arc<dyn ChainAdapter> {
        self.registry.adapter()
    }

    pub async fn get_move_struct(&self, qname: &str) -> Result<Arc<InternalMoveStruct>, DecodeError> {
        Ok(self.registry.lookup_struct(qname).await?)
    }

    pub async fn get_move_function(
        &self,
        qname: &str,
    ) -> Result<Arc<InternalMoveFunction>, DecodeError> {
        Ok(self.registry.lookup_function(qname).await?)
    }

    // ─── Decode ──────────────────────────────────────────────────────────────

    /// Decode a wire value against `ty`.
    pub fn decode<'a>(
        &'a self,
        data: &'a Value,
        ty: &'a TypeDescriptor,
    ) -> BoxFuture<'a, Result<MoveValue, DecodeError>> {
        async move {
            // references carry no decoding semantics
            if ty.reference {
                return Ok(MoveValue::Json(data.clone()));
            }

            let ov = self.overrides.get(ty).cloned();
            if let Some(ov) = &ov {
                match ov.decode(data, ty)? {
                    OverrideAction::Resolved(v) => return Ok(v),
                    OverrideAction::Redirect { data, ty } => return self.decode(&data, &ty).await,
                    OverrideAction::Generic => {}
                }
            }

            let decoded = self.decode_default(data, ty).await?;
            match ov {
                Some(ov) => ov.finish(decoded, ty),
                None => Ok(decoded),
            }
        }
        .boxed()
    }

    async fn decode_default(&self, data: &Value, ty: &TypeDescriptor) -> Result<MoveValue, DecodeError> {
        if is_builtin(&ty.qname) || ty.qname == STRING_TYPE {
            return self.decode_primitive(data, ty).await;
        }
        if self.registry.maybe_enum(&ty.qname).await?.is_some() {
            // enums are reflected, not decoded per variant
            return Ok(MoveValue::Json(data.clone()));
        }
        self.decode_struct(data, ty).await
    }

    async fn decode_primitive(&self, data: &Value, ty: &TypeDescriptor) -> Result<MoveValue, DecodeError> {
        let keyword = ty.qname.to_lowercase();
        match keyword.as_str() {
            "u64" | "u128" | "u256" => self
                .adapter()
                .decode_big_int(data)
                .map(MoveValue::BigInt)
                .ok_or_else(|| DecodeError::InvalidInteger {
                    value: data.to_string(),
                    type_: ty.signature(),
                }),
            "vector" => {
                let element = ty.type_args.first().ok_or_else(|| DecodeError::TypeMismatch {
                    expected: "vector<T>".into(),
                    got: ty.signature(),
                })?;
                // byte vectors stay opaque (hex string or raw array)
                if element.qname.eq_ignore_ascii_case("u8") {
                    return Ok(passthrough(data));
                }
                let items = data.as_array().ok_or_else(|| DecodeError::TypeMismatch {
                    expected: ty.signature(),
                    got: json_kind(data).into(),
                })?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.decode(item, element).await?);
                }
                Ok(MoveValue::Vector(out))
            }
            _ => Ok(passthrough(data)),
        }
    }

    async fn decode_struct(&self, data: &Value, ty: &TypeDescriptor) -> Result<MoveValue, DecodeError> {
        let def = self.registry.lookup_struct(&ty.qname).await?;
        let ctx = ty.type_arg_context();
        let payload = self.adapter().get_data(data);
        let object = payload.as_object().ok_or_else(|| DecodeError::TypeMismatch {
            expected: ty.signature(),
            got: json_kind(payload).into(),
        })?;

        let mut fields = IndexMap::with_capacity(def.fields.len());
        for field in &def.fields {
            let field_ty = field.type_.apply_type_args(&ctx);
            let raw = object.get(&field.name).ok_or_else(|| DecodeError::MissingField {
                field: field.name.clone(),
                type_: ty.signature(),
            })?;
            let value = self.decode(raw, &field_ty).await?;
            fields.insert(field.name.clone(), value);
        }
        Ok(MoveValue::Struct(fields))
    }

    /// Decode position-wise against `types`.
    ///
    /// In non-strict mode a `None` slot (argument present in a trace but not
    /// resolvable) is passed through as `Null`.
    pub async fn decode_array(
        &self,
        values: &[Option<Value>],
        types: &[TypeDescriptor],
        strict: bool,
    ) -> Result<Vec<MoveValue>, DecodeError> {
        if values.len() != types.len() {
            return Err(DecodeError::LengthMismatch {
                expected: types.len(),
                got: values.len(),
            });
        }
        let mut out = Vec::with_capacity(values.len());
        for (value, ty) in values.iter().zip(types) {
            let decoded = match value {
                None if !strict => Ok(MoveValue::Null),
                None => self.decode(&Value::Null, ty).await,
                Some(v) => self.decode(v, ty).await,
            }
            .map_err(|e| DecodeError::ArgumentFailed {
                value: value
                    .as_ref()
                    .map(Value::to_string)
                    .unwrap_or_else(|| "undefined".into()),
                expected: ty.signature(),
                source: Box::new(e),
            })?;
            out.push(decoded);
        }
        Ok(out)
    }

    /// Strict [`decode_array`](Self::decode_array) over present values.
    pub async fn decode_values(
        &self,
        values: &[Value],
        types: &[TypeDescriptor],
    ) -> Result<Vec<MoveValue>, DecodeError> {
        let slots: Vec<Option<Value>> = values.iter().cloned().map(Some).collect();
        self.decode_array(&slots, types, true).await
    }

    /// Decode a view / dev-inspect result list against a function's return types.
    pub async fn decode_call_result(
        &self,
        values: &[Value],
        function: &str,
    ) -> Result<Vec<MoveValue>, DecodeError> {
        let func = self.get_move_function(function).await?;
        self.decode_values(values, &func.returns).await
    }

    /// Decode call arguments against a function's meaningful parameters.
    pub async fn decode_function_args(
        &self,
        values: &[Option<Value>],
        function: &str,
        strict: bool,
    ) -> Result<Vec<MoveValue>, DecodeError> {
        let func = self.get_move_function(function).await?;
        let params = self.adapter().meaningful_function_params(&func.params);
        self.decode_array(values, &params, strict).await
    }

    /// Decode a typed wire object (event, resource, object) using its own type tag.
    pub async fn decoded_struct(&self, value: &Value) -> Result<DecodedStruct, DecodeError> {
        let tag = self
            .adapter()
            .get_type(value)
            .ok_or_else(|| DecodeError::MissingField {
                field: "type".into(),
                type_: "typed object".into(),
            })?;
        let ty = parse_move_type(&tag)?;
        let data_decoded = self.decode(value, &ty).await?;
        Ok(DecodedStruct {
            raw: value.clone(),
            data_decoded,
            type_arguments: ty.type_args.iter().map(|t| t.signature()).collect(),
        })
    }

    /// Keep the objects whose type tag matches `pattern` and decode each.
    ///
    /// Objects that fail to decode are logged and skipped so one bad item
    /// cannot sink the whole batch.
    pub async fn filter_and_decode(
        &self,
        pattern: &TypeDescriptor,
        values: &[Value],
    ) -> Vec<DecodedStruct> {
        let mut out = Vec::new();
        for (index, value) in values.iter().enumerate() {
            let Some(tag) = self.adapter().get_type(value) else {
                continue;
            };
            let ty = match parse_move_type(&tag) {
                Ok(ty) => ty,
                Err(e) => {
                    warn!(index, type_tag = %tag, error = %e, "skipping object with malformed type tag");
                    continue;
                }
            };
            if !match_type(pattern, &ty) {
                continue;
            }
            match self.decoded_struct(value).await {
                Ok(decoded) => out.push(decoded),
                Err(e) => warn!(index, type_tag = %tag, error = %e, "skipping object that failed to decode"),
            }
        }
        out
    }

    /// Decode `value` as `ty` if its type tag (when present) matches.
    ///
    /// Returns `Ok(None)` on a tag mismatch. A wildcard pattern is allowed
    /// only when the value carries a concrete tag to decode with.
    pub async fn decode_type(
        &self,
        value: &Value,
        ty: &TypeDescriptor,
    ) -> Result<Option<MoveValue>, DecodeError> {
        if value.is_null() {
            return Ok(Some(MoveValue::Null));
        }
        let tag = self.adapter().get_type(value);
        let concrete = match tag {
            Some(tag) => {
                let actual = parse_move_type(&tag)?;
                if !match_type(ty, &actual) {
                    return Ok(None);
                }
                if ty.exist_any_type() {
                    actual
                } else {
                    ty.clone()
                }
            }
            None if ty.exist_any_type() => {
                return Err(DecodeError::AmbiguousType(ty.signature()));
            }
            None => ty.clone(),
        };
        self.decode(value, &concrete).await.map(Some)
    }

    // ─── Encode ──────────────────────────────────────────────────────────────

    /// Schema-free encoding: big integers become decimal strings, everything
    /// else keeps its shape.
    pub fn encode(&self, value: &MoveValue) -> Value {
        value.to_json()
    }

    pub fn encode_array(&self, values: &[MoveValue]) -> Vec<Value> {
        values.iter().map(|v| self.encode(v)).collect()
    }

    /// Encode with the schema when a type is given, duck-typed otherwise.
    pub async fn encode_with(
        &self,
        value: &MoveValue,
        ty: Option<&TypeDescriptor>,
    ) -> Result<Value, DecodeError> {
        match ty {
            Some(ty) => self.encode_typed(value, ty).await,
            None => Ok(self.encode(value)),
        }
    }

    /// Schema-driven encoding: validates integer widths and emits struct
    /// fields in declaration order.
    pub fn encode_typed<'a>(
        &'a self,
        value: &'a MoveValue,
        ty: &'a TypeDescriptor,
    ) -> BoxFuture<'a, Result<Value, DecodeError>> {
        async move {
            if ty.reference || value.is_null() {
                return Ok(value.to_json());
            }
            if let MoveValue::Json(raw) = value {
                return Ok(raw.clone());
            }
            let mismatch = || DecodeError::TypeMismatch {
                expected: ty.signature(),
                got: value.to_string(),
            };
            let keyword = ty.qname.to_lowercase();
            if let Some(max) = integer_max(&keyword) {
                let n = match value {
                    MoveValue::String(s) => U256::from_str_radix(s, 10).ok(),
                    other => other.as_big_int(),
                }
                .ok_or_else(mismatch)?;
                if n > max {
                    return Err(DecodeError::InvalidInteger {
                        value: n.to_string(),
                        type_: ty.signature(),
                    });
                }
                return Ok(match keyword.as_str() {
                    "u8" | "u16" | "u32" => Value::from(n.to::<u64>()),
                    _ => Value::String(n.to_string()),
                });
            }
            match keyword.as_str() {
                "bool" => return value.as_bool().map(Value::Bool).ok_or_else(mismatch),
                "address" | "signer" => {
                    return value
                        .as_str()
                        .map(|s| Value::String(s.to_string()))
                        .ok_or_else(mismatch)
                }
                "vector" => {
                    let element = ty.type_args.first().ok_or_else(mismatch)?;
                    if element.qname.eq_ignore_ascii_case("u8") {
                        if let Some(s) = value.as_str() {
                            return Ok(Value::String(s.to_string()));
                        }
                    }
                    let items = value.as_vector().ok_or_else(mismatch)?;
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.push(self.encode_typed(item, element).await?);
                    }
                    return Ok(Value::Array(out));
                }
                _ => {}
            }
            if ty.qname == STRING_TYPE {
                return value
                    .as_str()
                    .map(|s| Value::String(s.to_string()))
                    .ok_or_else(mismatch);
            }
            if self.overrides.get(ty).is_some() || self.registry.maybe_enum(&ty.qname).await?.is_some() {
                return Ok(value.to_json());
            }

            let def = self.registry.lookup_struct(&ty.qname).await?;
            let MoveValue::Struct(fields) = value else {
                return Err(mismatch());
            };
            let ctx = ty.type_arg_context();
            let mut out = Map::new();
            for field in &def.fields {
                let field_value = fields.get(&field.name).ok_or_else(|| DecodeError::MissingField {
                    field: field.name.clone(),
                    type_: ty.signature(),
                })?;
                let field_ty = field.type_.apply_type_args(&ctx);
                out.insert(field.name.clone(), self.encode_typed(field_value, &field_ty).await?);
            }
            Ok(Value::Object(out))
        }
        .boxed()
    }
}

impl std::fmt::Debug for MoveCoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveCoder")
            .field("registry", &self.registry)
            .field("overrides", &self.overrides)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movecodec_registry::{NormalizedAdapter, StaticFetcher};
    use serde_json::json;

    fn pool_module() -> Value {
        json!({
            "address": "0x5a",
            "name": "pool",
            "structs": [
                {
                    "name": "Wrapper",
                    "abilities": ["store"],
                    "type_params": [{"constraints": []}],
                    "fields": [
                        {"name": "f", "type": "T0"},
                        {"name": "items", "type": "vector<T0>"},
                        {"name": "blob", "type": "vector<u8>"}
                    ]
                },
                {
                    "name": "Pair",
                    "type_params": [{"constraints": []}, {"constraints": []}],
                    "fields": [
                        {"name": "left", "type": "0x5a::pool::Wrapper<T1>"},
                        {"name": "flag", "type": "bool"},
                        {"name": "kind", "type": "0x5a::pool::Kind"}
                    ]
                }
            ],
            "functions": [{
                "name": "swap",
                "visibility": "public",
                "is_entry": true,
                "params": ["u64", "vector<u8>", "address"],
                "return": ["u128", "bool"]
            }],
            "enums": [{"name": "Kind", "variants": {"A": [], "B": []}}]
        })
    }

    fn coder_with(fetcher: Arc<StaticFetcher>) -> MoveCoder {
        MoveCoder::new(ModuleRegistry::new(
            Arc::new(NormalizedAdapter::default()),
            fetcher,
        ))
    }

    fn t(s: &str) -> TypeDescriptor {
        parse_move_type(s).unwrap()
    }

    #[tokio::test]
    async fn primitives() {
        let coder = coder_with(Arc::new(StaticFetcher::new()));
        let v = coder.decode(&json!("18446744073709551615"), &t("u64")).await.unwrap();
        assert_eq!(v, MoveValue::BigInt(U256::from(u64::MAX)));
        // same input, same result
        let again = coder.decode(&json!("18446744073709551615"), &t("U64")).await.unwrap();
        assert_eq!(v, again);

        assert_eq!(coder.decode(&json!(7), &t("u8")).await.unwrap(), MoveValue::Number(7));
        assert_eq!(coder.decode(&json!(true), &t("bool")).await.unwrap(), MoveValue::Bool(true));
        assert_eq!(
            coder.decode(&json!("0xdeadbeef"), &t("vector<u8>")).await.unwrap(),
            MoveValue::String("0xdeadbeef".into())
        );
        assert!(matches!(
            coder.decode(&json!("abc"), &t("u128")).await,
            Err(DecodeError::InvalidInteger { .. })
        ));
    }

    #[tokio::test]
    async fn references_pass_through() {
        let coder = coder_with(Arc::new(StaticFetcher::new()));
        let raw = json!({"anything": 1});
        assert_eq!(
            coder.decode(&raw, &t("&0x9::x::Y")).await.unwrap(),
            MoveValue::Json(raw.clone())
        );
    }

    #[tokio::test]
    async fn generic_field_uses_concrete_argument() {
        let fetcher = Arc::new(StaticFetcher::new().with_account("0x5a", vec![pool_module()]));
        let coder = coder_with(fetcher.clone());

        let data = json!({"f": "42", "items": ["1", "2"], "blob": "0x00ff"});
        let v = coder.decode(&data, &t("0x5a::pool::Wrapper<u64>")).await.unwrap();
        assert_eq!(v.field("f"), Some(&MoveValue::BigInt(U256::from(42u64))));
        assert_eq!(
            v.field("items").and_then(|i| i.as_vector()).map(|i| i.len()),
            Some(2)
        );
        assert_eq!(v.field("blob"), Some(&MoveValue::String("0x00ff".into())));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn nested_substitution_and_enum_passthrough() {
        let fetcher = Arc::new(StaticFetcher::new().with_account("0x5a", vec![pool_module()]));
        let coder = coder_with(fetcher);

        let data = json!({
            "left": {"f": "9", "items": [], "blob": []},
            "flag": false,
            "kind": {"variant": "A"}
        });
        let v = coder
            .decode(&data, &t("0x5a::pool::Pair<bool, u128>"))
            .await
            .unwrap();
        let left = v.field("left").unwrap();
        assert_eq!(left.field("f"), Some(&MoveValue::BigInt(U256::from(9u64))));
        assert_eq!(v.field("kind"), Some(&MoveValue::Json(json!({"variant": "A"}))));
    }

    #[tokio::test]
    async fn missing_field_and_unknown_type_are_errors() {
        let fetcher = Arc::new(StaticFetcher::new().with_account("0x5a", vec![pool_module()]));
        let coder = coder_with(fetcher);

        let err = coder
            .decode(&json!({"f": "1"}), &t("0x5a::pool::Wrapper<u64>"))
            .await
            .unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { ref field, .. } if field == "items"));

        let err = coder
            .decode(&json!({}), &t("0x5a::pool::Nope"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Registry(movecodec_core::RegistryError::UnresolvedType { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_decodes_fetch_once() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_account("0x5a", vec![pool_module()])
                .with_delay(std::time::Duration::from_millis(20)),
        );
        let coder = coder_with(fetcher.clone());
        let ty = t("0x5a::pool::Wrapper<u8>");
        let a = json!({"f": 1, "items": [], "blob": ""});
        let b = json!({"f": 2, "items": [3], "blob": ""});

        let (ra, rb) = tokio::join!(coder.decode(&a, &ty), coder.decode(&b, &ty));
        assert!(ra.is_ok() && rb.is_ok());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn decode_array_modes() {
        let fetcher = Arc::new(StaticFetcher::new().with_account("0x5a", vec![pool_module()]));
        let coder = coder_with(fetcher);

        let args = vec![Some(json!("5")), None, Some(json!("0x1"))];
        let decoded = coder
            .decode_function_args(&args, "0x5a::pool::swap", false)
            .await
            .unwrap();
        assert_eq!(decoded[0], MoveValue::BigInt(U256::from(5u64)));
        assert_eq!(decoded[1], MoveValue::Null);

        let err = coder
            .decode_array(&[Some(json!("x"))], &[t("u64")], true)
            .await
            .unwrap_err();
        match err {
            DecodeError::ArgumentFailed { value, expected, .. } => {
                assert_eq!(value, "\"x\"");
                assert_eq!(expected, "u64");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let results = coder
            .decode_call_result(&[json!("100"), json!(true)], "0x5a::pool::swap")
            .await
            .unwrap();
        assert_eq!(results[1], MoveValue::Bool(true));

        assert!(matches!(
            coder.decode_values(&[json!(1), json!(2)], &[t("u8")]).await,
            Err(DecodeError::LengthMismatch { expected: 1, got: 2 })
        ));
        assert!(matches!(
            coder.decode_values(&[json!(1)], &[t("u8"), t("u8")]).await,
            Err(DecodeError::LengthMismatch { expected: 2, got: 1 })
        ));
    }

    #[tokio::test]
    async fn offline_registry_decodes_registered_structs() {
        let registry = ModuleRegistry::offline(Arc::new(NormalizedAdapter::default()));
        registry.load_modules(&[pool_module()], None).unwrap();
        let coder = MoveCoder::new(registry);

        let v = coder
            .decode(
                &json!({"f": "1", "items": ["2"], "blob": "0x00"}),
                &t("0x5a::pool::Wrapper<u64>"),
            )
            .await
            .unwrap();
        assert_eq!(v.field("f"), Some(&MoveValue::BigInt(U256::from(1u64))));
        assert!(!coder.registry().is_loaded("0x5a"));
    }

    #[tokio::test]
    async fn filter_and_decode_skips_bad_items() {
        let fetcher = Arc::new(StaticFetcher::new().with_account("0x5a", vec![pool_module()]));
        let coder = coder_with(fetcher);

        let values = vec![
            json!({"type": "0x5a::pool::Wrapper<u64>", "data": {"f": "1", "items": [], "blob": ""}}),
            json!({"type": "0x5a::pool::Wrapper<bool>", "data": {"f": true, "items": [], "blob": ""}}),
            // matches but is missing fields
            json!({"type": "0x5a::pool::Wrapper<u64>", "data": {"f": "1"}}),
            json!({"type": "0x5a::pool::Wrapper<u64", "data": {}}),
            json!({"no_type": true}),
        ];
        let pattern = t("0x5a::pool::Wrapper<u64>");
        let decoded = coder.filter_and_decode(&pattern, &values).await;
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].type_arguments, vec!["u64".to_string()]);

        let all = coder
            .filter_and_decode(&TypeDescriptor::with_args("0x5a::pool::Wrapper", vec![TypeDescriptor::any()]), &values)
            .await;
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn decode_type_checks_tag() {
        let fetcher = Arc::new(StaticFetcher::new().with_account("0x5a", vec![pool_module()]));
        let coder = coder_with(fetcher);
        let value = json!({"type": "0x5a::pool::Wrapper<u64>", "data": {"f": "3", "items": [], "blob": ""}});

        assert!(coder
            .decode_type(&value, &t("0x5a::pool::Wrapper<bool>"))
            .await
            .unwrap()
            .is_none());
        let v = coder
            .decode_type(&value, &t("0x5a::pool::Wrapper<any>"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(v.field("f"), Some(&MoveValue::BigInt(U256::from(3u64))));

        assert!(matches!(
            coder.decode_type(&json!({"f": "1"}), &t("0x5a::pool::Wrapper<any>")).await,
            Err(DecodeError::AmbiguousType(_))
        ));
    }

    /// Wire objects tagged under `kind` with their fields in `body`.
    struct KindTagged(NormalizedAdapter);

    impl ChainAdapter for KindTagged {
        fn chain_family(&self) -> movecodec_core::ChainFamily {
            self.0.chain_family()
        }

        fn to_internal_modules(
            &self,
            raw: &[movecodec_core::RawModule],
        ) -> Result<Vec<movecodec_core::InternalMoveModule>, movecodec_core::TranslateError> {
            self.0.to_internal_modules(raw)
        }

        fn meaningful_function_params(&self, params: &[TypeDescriptor]) -> Vec<TypeDescriptor> {
            params.to_vec()
        }

        fn get_type(&self, value: &Value) -> Option<String> {
            value.get("kind").and_then(Value::as_str).map(str::to_string)
        }

        fn get_data<'a>(&self, value: &'a Value) -> &'a Value {
            value.get("body").unwrap_or(value)
        }

        fn event_structs(
            &self,
            modules: &[movecodec_core::InternalMoveModule],
        ) -> IndexMap<String, InternalMoveStruct> {
            self.0.event_structs(modules)
        }
    }

    #[tokio::test]
    async fn decode_type_reads_tag_through_adapter() {
        let registry = ModuleRegistry::offline(Arc::new(KindTagged(NormalizedAdapter::default())));
        registry.load_modules(&[pool_module()], None).unwrap();
        let coder = MoveCoder::new(registry);
        let value = json!({"kind": "0x5a::pool::Wrapper<u64>", "body": {"f": "4", "items": [], "blob": ""}});

        assert!(coder
            .decode_type(&value, &t("0x5a::pool::Wrapper<bool>"))
            .await
            .unwrap()
            .is_none());
        let v = coder
            .decode_type(&value, &t("0x5a::pool::Wrapper<any>"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(v.field("f"), Some(&MoveValue::BigInt(U256::from(4u64))));
    }

    #[tokio::test]
    async fn encode_round_trip() {
        let fetcher = Arc::new(StaticFetcher::new().with_account("0x5a", vec![pool_module()]));
        let coder = coder_with(fetcher);
        let ty = t("0x5a::pool::Wrapper<u64>");
        let data = json!({"f": "42", "items": ["1"], "blob": "0x01"});

        let decoded = coder.decode(&data, &ty).await.unwrap();
        assert_eq!(coder.encode(&decoded), data);
        assert_eq!(coder.encode_with(&decoded, Some(&ty)).await.unwrap(), data);
        assert_eq!(coder.encode_with(&decoded, None).await.unwrap(), data);

        let too_big = MoveValue::BigInt(U256::from(256u64));
        assert!(matches!(
            coder.encode_typed(&too_big, &t("u8")).await,
            Err(DecodeError::InvalidInteger { .. })
        ));
        assert_eq!(
            coder.encode_array(&[MoveValue::BigInt(U256::from(1u64)), MoveValue::Bool(false)]),
            vec![json!("1"), json!(false)]
        );
    }
}
