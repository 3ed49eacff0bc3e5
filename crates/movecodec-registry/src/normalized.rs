//! Adapter for modules already stored in the normalized schema.
//!
//! ABI caches written by movecodec itself (and hand-written fixtures) use
//! the serde form of [`InternalMoveModule`] directly, so no chain-specific
//! translation is needed.

use indexmap::IndexMap;
use movecodec_core::{
    ChainAdapter, ChainFamily, InternalMoveModule, InternalMoveStruct, RawModule,
    TranslateError, TypeDescriptor,
};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct NormalizedAdapter {
    family: ChainFamily,
}

impl NormalizedAdapter {
    pub fn new(family: ChainFamily) -> Self {
        Self { family }
    }
}

impl Default for NormalizedAdapter {
    fn default() -> Self {
        Self::new(ChainFamily::Custom("normalized".into()))
    }
}

impl ChainAdapter for NormalizedAdapter {
    fn chain_family(&self) -> ChainFamily {
        self.family.clone()
    }

    fn to_internal_modules(
        &self,
        raw: &[RawModule],
    ) -> Result<Vec<InternalMoveModule>, TranslateError> {
        raw.iter()
            .map(|m| {
                serde_json::from_value(m.clone()).map_err(|e| TranslateError::Invalid {
                    context: "normalized module".into(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    fn meaningful_function_params(&self, params: &[TypeDescriptor]) -> Vec<TypeDescriptor> {
        params.to_vec()
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
        modules
            .iter()
            .flat_map(|m| {
                m.structs
                    .iter()
                    .filter(|s| s.is_event)
                    .map(move |s| (m.member_qname(&s.name), s.clone()))
            })
            .collect()
    }
}
