//! `AptosCoder`: event, resource and entry-function decoding on top of the
//! generic [`MoveCoder`].

use crate::abi::EntryFunctionPayload;
use crate::adapter::AptosChainAdapter;
use movecodec_coder::MoveCoder;
use movecodec_core::{
    parse_move_type, DecodeError, DecodedStruct, ModuleFetcher, MoveValue, OfflineFetcher,
    TypeDescriptor,
};
use movecodec_registry::ModuleRegistry;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// An entry function payload with its arguments decoded.
#[derive(Debug, Clone, Serialize)]
pub struct TypedFunctionPayload {
    #[serde(flatten)]
    pub payload: EntryFunctionPayload,
    pub arguments_decoded: Vec<MoveValue>,
}

/// Resource change inside a transaction's write set.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedResourceChange {
    #[serde(flatten)]
    pub raw: Value,
    pub data_decoded: Option<MoveValue>,
}

/// A type argument accepted either as a signature string or a parsed descriptor.
pub trait IntoTypeDescriptor {
    fn into_type(self) -> Result<TypeDescriptor, DecodeError>;
}

impl IntoTypeDescriptor for &str {
    fn into_type(self) -> Result<TypeDescriptor, DecodeError> {
        Ok(parse_move_type(self)?)
    }
}

impl IntoTypeDescriptor for TypeDescriptor {
    fn into_type(self) -> Result<TypeDescriptor, DecodeError> {
        Ok(self)
    }
}

impl IntoTypeDescriptor for &TypeDescriptor {
    fn into_type(self) -> Result<TypeDescriptor, DecodeError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone)]
pub struct AptosCoder {
    inner: MoveCoder,
}

impl AptosCoder {
    /// Coder that loads missing accounts through `fetcher`.
    pub fn new(fetcher: Arc<dyn ModuleFetcher>) -> Self {
        Self::from_registry(ModuleRegistry::new(Arc::new(AptosChainAdapter), fetcher))
    }

    /// Coder over preloaded modules only.
    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineFetcher))
    }

    pub fn from_registry(registry: ModuleRegistry) -> Self {
        Self {
            inner: MoveCoder::new(registry),
        }
    }

    pub fn coder(&self) -> &MoveCoder {
        &self.inner
    }

    pub fn registry(&self) -> &ModuleRegistry {
        self.inner.registry()
    }

    /// Decode one event using its `type` tag.
    pub async fn decode_event(&self, event: &Value) -> Result<DecodedStruct, DecodeError> {
        self.inner.decoded_struct(event).await
    }

    /// Decode the events whose type matches `pattern`; failures are skipped.
    pub async fn filter_and_decode_events(
        &self,
        pattern: impl IntoTypeDescriptor,
        events: &[Value],
    ) -> Result<Vec<DecodedStruct>, DecodeError> {
        let pattern = pattern.into_type()?;
        Ok(self.inner.filter_and_decode(&pattern, events).await)
    }

    /// Decode one `{type, data}` resource.
    pub async fn decode_resource(&self, resource: &Value) -> Result<DecodedStruct, DecodeError> {
        self.inner.decoded_struct(resource).await
    }

    pub async fn filter_and_decode_resources(
        &self,
        pattern: impl IntoTypeDescriptor,
        resources: &[Value],
    ) -> Result<Vec<DecodedStruct>, DecodeError> {
        let pattern = pattern.into_type()?;
        Ok(self.inner.filter_and_decode(&pattern, resources).await)
    }

    /// Decode the arguments of an entry function call against the
    /// function's parameters, leading signer excluded.
    pub async fn decode_function_payload(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<TypedFunctionPayload, DecodeError> {
        let args: Vec<Option<Value>> = payload.arguments.iter().cloned().map(Some).collect();
        let arguments_decoded = self
            .inner
            .decode_function_args(&args, &payload.function, false)
            .await?;
        Ok(TypedFunctionPayload {
            payload: payload.clone(),
            arguments_decoded,
        })
    }

    /// Decode the `data` of every write-resource change. Changes without
    /// data (deletions, module writes) keep `data_decoded` empty.
    pub async fn decode_resource_changes(
        &self,
        changes: &[Value],
    ) -> Result<Vec<DecodedResourceChange>, DecodeError> {
        let mut out = Vec::with_capacity(changes.len());
        for change in changes {
            let data_decoded = match change.get("data") {
                Some(data) if data.get("type").is_some() => {
                    Some(self.inner.decoded_struct(data).await?.data_decoded)
                }
                _ => None,
            };
            out.push(DecodedResourceChange {
                raw: change.clone(),
                data_decoded,
            });
        }
        Ok(out)
    }

    /// Decode a view function's return values.
    pub async fn decode_view_result(
        &self,
        function: &str,
        values: &[Value],
    ) -> Result<Vec<MoveValue>, DecodeError> {
        self.inner.decode_call_result(values, function).await
    }

    pub async fn decode(&self, value: &Value, ty: impl IntoTypeDescriptor) -> Result<MoveValue, DecodeError> {
        let ty = ty.into_type()?;
        self.inner.decode(value, &ty).await
    }

    pub async fn encode(&self, value: &MoveValue, ty: impl IntoTypeDescriptor) -> Result<Value, DecodeError> {
        let ty = ty.into_type()?;
        self.inner.encode_typed(value, &ty).await
    }
}
