//! Named-type decode overrides.
//!
//! Chains special-case a handful of framework types (`Option`, `String`,
//! `UID`, ...) whose wire form does not follow the generic struct shape. An
//! override is registered by qualified name and consulted before the
//! generic path, so the recursive decoder itself stays chain-agnostic.

use movecodec_core::{DecodeError, MoveValue, TypeDescriptor};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// What an override decided for one value.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideAction {
    /// Final value; no further decoding.
    Resolved(MoveValue),
    /// Decode `data` as `ty` instead.
    Redirect { data: Value, ty: TypeDescriptor },
    /// Decode through the generic struct path, then pass the result to
    /// [`ValueOverride::finish`].
    Generic,
}

pub trait ValueOverride: Send + Sync {
    /// Qualified name handled, e.g. `0x1::option::Option`. Built-in
    /// keywords are matched lowercase (`address`).
    fn qname(&self) -> &str;

    fn decode(&self, data: &Value, ty: &TypeDescriptor) -> Result<OverrideAction, DecodeError>;

    /// Post-process a generically decoded struct.
    fn finish(&self, decoded: MoveValue, _ty: &TypeDescriptor) -> Result<MoveValue, DecodeError> {
        Ok(decoded)
    }
}

/// Overrides keyed by qualified name.
#[derive(Clone, Default)]
pub struct OverrideSet {
    by_qname: HashMap<String, Arc<dyn ValueOverride>>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later registrations replace earlier ones for the same name.
    pub fn insert(&mut self, ov: Arc<dyn ValueOverride>) {
        self.by_qname.insert(ov.qname().to_string(), ov);
    }

    pub fn get(&self, ty: &TypeDescriptor) -> Option<&Arc<dyn ValueOverride>> {
        if self.by_qname.is_empty() {
            return None;
        }
        self.by_qname
            .get(&ty.qname)
            .or_else(|| self.by_qname.get(&ty.qname.to_lowercase()))
    }

    pub fn len(&self) -> usize {
        self.by_qname.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_qname.is_empty()
    }
}

impl std::fmt::Debug for OverrideSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.by_qname.keys().collect();
        names.sort();
        f.debug_struct("OverrideSet").field("qnames", &names).finish()
    }
}

/// Passes strings through untouched and decodes anything else generically.
/// Covers types a chain renders as a plain string in JSON but as a struct
/// in binary form.
#[derive(Debug, Clone)]
pub struct StringPassthrough {
    qname: String,
}

impl StringPassthrough {
    pub fn new(qname: impl Into<String>) -> Self {
        Self {
            qname: qname.into(),
        }
    }
}

impl ValueOverride for StringPassthrough {
    fn qname(&self) -> &str {
        &self.qname
    }

    fn decode(&self, data: &Value, _ty: &TypeDescriptor) -> Result<OverrideAction, DecodeError> {
        match data {
            Value::String(s) => Ok(OverrideAction::Resolved(MoveValue::String(s.clone()))),
            Value::Null => Ok(OverrideAction::Resolved(MoveValue::Null)),
            _ => Ok(OverrideAction::Generic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_by_qname_and_lowercase_builtin() {
        let mut set = OverrideSet::new();
        set.insert(Arc::new(StringPassthrough::new("0x2::object::ID")));
        set.insert(Arc::new(StringPassthrough::new("address")));

        let id = TypeDescriptor::new("0x2::object::ID");
        assert!(set.get(&id).is_some());
        assert!(set.get(&TypeDescriptor::new("Address")).is_some());
        assert!(set.get(&TypeDescriptor::new("0x2::object::UID")).is_none());

        let ov = set.get(&id).unwrap();
        assert_eq!(
            ov.decode(&json!("0xabc"), &id).unwrap(),
            OverrideAction::Resolved(MoveValue::String("0xabc".into()))
        );
        assert_eq!(
            ov.decode(&json!({"bytes": "0xabc"}), &id).unwrap(),
            OverrideAction::Generic
        );
    }
}
