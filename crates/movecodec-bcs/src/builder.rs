//! Compiles [`TypeDescriptor`]s into [`BinaryLayout`]s, loading struct and
//! enum definitions through the registry.
//!
//! Layouts are memoized by normalized signature, so `vector<U64>` and
//! `vector<u64>` share one entry, and repeated decodes of the same type
//! never touch the registry again.

use crate::encoding::Encoding;
use crate::layout::{BinaryLayout, FieldLayout};
use crate::{reader, writer};
use futures::future::{BoxFuture, FutureExt};
use movecodec_core::{
    types::STRING_TYPE, BcsError, InternalMoveField, TypeContext, TypeDescriptor,
};
use movecodec_registry::ModuleRegistry;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

#[derive(Clone)]
pub struct BcsSchemaBuilder {
    registry: ModuleRegistry,
    layouts: Arc<RwLock<HashMap<String, Arc<BinaryLayout>>>>,
}

impl BcsSchemaBuilder {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self {
            registry,
            layouts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Number of memoized layouts.
    pub fn cached(&self) -> usize {
        self.layouts.read().unwrap().len()
    }

    /// Layout for a fully instantiated type.
    pub fn compile<'a>(
        &'a self,
        ty: &'a TypeDescriptor,
    ) -> BoxFuture<'a, Result<Arc<BinaryLayout>, BcsError>> {
        async move {
            let ty = ty.dereferenced();
            let key = ty.normalized_signature();
            let cached = self.layouts.read().unwrap().get(&key).cloned();
            if let Some(layout) = cached {
                return Ok(layout);
            }

            let layout = Arc::new(self.build(&ty).await?);
            debug!(signature = %key, "compiled binary layout");
            // a concurrent compile of the same key produced an equal layout
            self.layouts
                .write()
                .unwrap()
                .entry(key)
                .or_insert_with(|| layout.clone());
            Ok(layout)
        }
        .boxed()
    }

    async fn build(&self, ty: &TypeDescriptor) -> Result<BinaryLayout, BcsError> {
        if let Some(primitive) = BinaryLayout::primitive(&ty.qname) {
            return Ok(primitive);
        }
        if ty.qname == STRING_TYPE {
            return Ok(BinaryLayout::String);
        }
        if ty.is_vector() {
            let element = ty
                .type_args
                .first()
                .ok_or_else(|| BcsError::Unsupported(ty.signature()))?;
            return Ok(BinaryLayout::Vector(self.compile(element).await?));
        }
        if ty.is_type_parameter() || ty.exist_any_type() || ty.module().is_none() {
            return Err(BcsError::Unsupported(ty.signature()));
        }

        let ctx = ty.type_arg_context();
        if let Some(def) = self.registry.maybe_enum(&ty.qname).await? {
            let mut variants = Vec::with_capacity(def.variants.len());
            for (name, fields) in &def.variants {
                variants.push((name.clone(), self.compile_fields(fields, &ctx).await?));
            }
            return Ok(BinaryLayout::Enum {
                qname: ty.qname.clone(),
                variants,
            });
        }

        let def = self.registry.lookup_struct(&ty.qname).await?;
        Ok(BinaryLayout::Struct {
            qname: ty.qname.clone(),
            fields: self.compile_fields(&def.fields, &ctx).await?,
        })
    }

    async fn compile_fields(
        &self,
        fields: &[InternalMoveField],
        ctx: &TypeContext,
    ) -> Result<Vec<FieldLayout>, BcsError> {
        let mut out = Vec::with_capacity(fields.len());
        for field in fields {
            let field_ty = field.type_.apply_type_args(ctx);
            out.push((field.name.clone(), self.compile(&field_ty).await?));
        }
        Ok(out)
    }

    /// Decode BCS bytes of type `ty` to chain-style JSON.
    pub async fn decode_binary(&self, ty: &TypeDescriptor, bytes: &[u8]) -> Result<Value, BcsError> {
        let layout = self.compile(ty).await?;
        reader::read_value(&layout, bytes)
    }

    /// Decode text-encoded BCS bytes of type `ty`.
    pub async fn decode_encoded(
        &self,
        ty: &TypeDescriptor,
        data: &str,
        encoding: Encoding,
    ) -> Result<Value, BcsError> {
        let bytes = encoding.decode(data)?;
        self.decode_binary(ty, &bytes).await
    }

    /// Serialize chain-style JSON of type `ty` to BCS bytes.
    pub async fn encode_binary(&self, ty: &TypeDescriptor, value: &Value) -> Result<Vec<u8>, BcsError> {
        let layout = self.compile(ty).await?;
        writer::to_bytes(&layout, value)
    }
}

impl std::fmt::Debug for BcsSchemaBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BcsSchemaBuilder")
            .field("cached", &self.cached())
            .finish()
    }
}
