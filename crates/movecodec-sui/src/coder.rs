//! `SuiCoder`: events, objects, dynamic fields, move calls and BCS values.

use crate::adapter::SuiChainAdapter;
use crate::models::{CallArg, DevInspectResults, MoveCallTransaction, TypedDevInspectResults, TypedMoveCall};
use crate::overrides::sui_overrides;
use movecodec_bcs::{BcsSchemaBuilder, Encoding};
use movecodec_coder::MoveCoder;
use movecodec_core::{
    parse_move_type, DecodeError, DecodedStruct, ModuleFetcher, MoveValue, OfflineFetcher,
    TypeDescriptor,
};
use movecodec_registry::ModuleRegistry;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub const DYNAMIC_FIELD: &str = "0x2::dynamic_field::Field";

#[derive(Debug, Clone)]
pub struct SuiCoder {
    inner: MoveCoder,
    bcs: BcsSchemaBuilder,
}

impl SuiCoder {
    pub fn new(fetcher: Arc<dyn ModuleFetcher>) -> Self {
        Self::from_registry(ModuleRegistry::new(Arc::new(SuiChainAdapter), fetcher))
    }

    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineFetcher))
    }

    /// The binary layout builder shares the coder's registry.
    pub fn from_registry(registry: ModuleRegistry) -> Self {
        Self {
            bcs: BcsSchemaBuilder::new(registry.clone()),
            inner: MoveCoder::new(registry).with_overrides(sui_overrides()),
        }
    }

    pub fn coder(&self) -> &MoveCoder {
        &self.inner
    }

    pub fn registry(&self) -> &ModuleRegistry {
        self.inner.registry()
    }

    pub fn bcs(&self) -> &BcsSchemaBuilder {
        &self.bcs
    }

    pub async fn decode(&self, value: &Value, ty: &TypeDescriptor) -> Result<MoveValue, DecodeError> {
        self.inner.decode(value, ty).await
    }

    pub async fn decode_event(&self, event: &Value) -> Result<DecodedStruct, DecodeError> {
        self.inner.decoded_struct(event).await
    }

    pub async fn filter_and_decode_events(
        &self,
        pattern: &str,
        events: &[Value],
    ) -> Result<Vec<DecodedStruct>, DecodeError> {
        let pattern = parse_move_type(pattern)?;
        Ok(self.inner.filter_and_decode(&pattern, events).await)
    }

    pub async fn filter_and_decode_objects(
        &self,
        pattern: &TypeDescriptor,
        objects: &[Value],
    ) -> Vec<DecodedStruct> {
        self.inner.filter_and_decode(pattern, objects).await
    }

    /// Decoded `Field<K, V>` objects whose key and value types match.
    /// `None` matches any type.
    pub async fn get_dynamic_fields(
        &self,
        objects: &[Value],
        key: Option<TypeDescriptor>,
        value: Option<TypeDescriptor>,
    ) -> Vec<MoveValue> {
        let pattern = TypeDescriptor::with_args(
            DYNAMIC_FIELD,
            vec![
                key.unwrap_or_else(TypeDescriptor::any),
                value.unwrap_or_else(TypeDescriptor::any),
            ],
        );
        self.filter_and_decode_objects(&pattern, objects)
            .await
            .into_iter()
            .map(|d| d.data_decoded)
            .collect()
    }

    /// Decode a move call's arguments. Pure inputs are decoded against the
    /// function's parameters; object inputs and command results are not
    /// available here and come out as `Null`.
    pub async fn decode_move_call(
        &self,
        payload: &MoveCallTransaction,
        inputs: &[Value],
    ) -> Result<TypedMoveCall, DecodeError> {
        let mut args = Vec::with_capacity(payload.arguments.len());
        for argument in &payload.arguments {
            let Some(index) = MoveCallTransaction::input_index(argument) else {
                args.push(None);
                continue;
            };
            let arg = match inputs.get(index).cloned().map(serde_json::from_value::<CallArg>) {
                Some(Ok(CallArg::Pure { value, .. })) => Some(value),
                Some(Ok(CallArg::Object { .. })) => None,
                Some(Err(e)) => {
                    warn!(index, error = %e, "unexpected move call input");
                    None
                }
                None => {
                    warn!(index, "move call refers to a missing input");
                    None
                }
            };
            args.push(arg);
        }
        let arguments_decoded = self
            .inner
            .decode_function_args(&args, &payload.function_qname(), false)
            .await?;
        Ok(TypedMoveCall {
            payload: payload.clone(),
            arguments_decoded,
        })
    }

    /// BCS bytes of `ty` → node-style JSON.
    pub async fn decode_bcs(&self, ty: &TypeDescriptor, bytes: &[u8]) -> Result<Value, DecodeError> {
        Ok(self.bcs.decode_binary(ty, bytes).await?)
    }

    pub async fn decode_bcs_encoded(
        &self,
        ty: &TypeDescriptor,
        data: &str,
        encoding: Encoding,
    ) -> Result<Value, DecodeError> {
        Ok(self.bcs.decode_encoded(ty, data, encoding).await?)
    }

    /// BCS-decode every return value, then decode it as its declared type.
    pub async fn decode_dev_inspect_result(
        &self,
        inspect: &DevInspectResults,
    ) -> Result<TypedDevInspectResults, DecodeError> {
        let mut results_decoded = Vec::new();
        for result in inspect.results.iter().flatten() {
            let Some(values) = &result.return_values else {
                results_decoded.push(MoveValue::Null);
                continue;
            };
            for (bytes, signature) in values {
                let ty = parse_move_type(signature)?;
                let json = self.decode_bcs(&ty, bytes).await?;
                results_decoded.push(self.inner.decode(&json, &ty).await?);
            }
        }
        Ok(TypedDevInspectResults {
            raw: inspect.clone(),
            results_decoded,
        })
    }

    /// Decode a view-style call result list against the function's returns.
    pub async fn decode_call_result(
        &self,
        function: &str,
        values: &[Value],
    ) -> Result<Vec<MoveValue>, DecodeError> {
        self.inner.decode_call_result(values, function).await
    }
}
