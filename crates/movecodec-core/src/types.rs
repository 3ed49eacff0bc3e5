//! `TypeDescriptor`: the tree form of a Move type signature.
//!
//! A descriptor is a qualified name plus ordered type arguments, e.g.
//! `0x1::coin::Coin<0x1::aptos_coin::AptosCoin>`. The qualified name is a
//! built-in keyword (`u64`, `vector`, ...), a bare generic placeholder
//! (`T0`), or `account::module::name`.

use crate::address::SPLITTER;
use crate::error::TypeParseError;
use crate::parser::parse_move_type;
use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Wildcard qname used in type patterns.
pub const ANY_TYPE: &str = "any";

/// Element type constructor for vectors.
pub const VECTOR_STR: &str = "vector";

/// Built-in type keywords, lowercase.
pub const BUILTIN_TYPES: &[&str] = &[
    "address", "signer", "vector", "bool", "u8", "u16", "u32", "u64", "u128", "u256",
];

/// `0x1::string::String`, treated as a primitive everywhere.
pub const STRING_TYPE: &str = "0x1::string::String";

/// Substitution map from generic placeholders (`T0`, `T1`, …) to concrete types.
pub type TypeContext = HashMap<String, TypeDescriptor>;

/// Whether `qname` is a built-in keyword, ignoring case.
pub fn is_builtin(qname: &str) -> bool {
    BUILTIN_TYPES
        .iter()
        .any(|b| b.eq_ignore_ascii_case(qname))
}

/// Lowercases built-in keywords, leaves everything else untouched.
fn normalize_builtin(qname: &str) -> String {
    if is_builtin(qname) {
        qname.to_ascii_lowercase()
    } else {
        qname.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub qname: String,
    pub type_args: Vec<TypeDescriptor>,
    /// Borrowed rather than owned.
    pub reference: bool,
    /// Mutable borrow. Only meaningful when `reference` is set.
    pub mutable: bool,
}

impl TypeDescriptor {
    pub fn new(qname: impl Into<String>) -> Self {
        Self {
            qname: qname.into(),
            type_args: Vec::new(),
            reference: false,
            mutable: false,
        }
    }

    pub fn with_args(qname: impl Into<String>, type_args: Vec<TypeDescriptor>) -> Self {
        Self {
            type_args,
            ..Self::new(qname)
        }
    }

    /// The wildcard pattern type.
    pub fn any() -> Self {
        Self::new(ANY_TYPE)
    }

    /// `vector<element>`.
    pub fn vector(element: TypeDescriptor) -> Self {
        Self::with_args(VECTOR_STR, vec![element])
    }

    pub fn parse(signature: &str) -> Result<Self, TypeParseError> {
        parse_move_type(signature)
    }

    /// Copy of this descriptor with its type arguments replaced.
    pub fn apply(&self, type_args: Vec<TypeDescriptor>) -> Self {
        Self {
            qname: self.qname.clone(),
            type_args,
            reference: self.reference,
            mutable: self.mutable,
        }
    }

    /// Compare qnames, ignoring case for built-in keywords.
    pub fn compare_qname(&self, other: &TypeDescriptor) -> bool {
        if is_builtin(&self.qname) && is_builtin(&other.qname) {
            return self.qname.eq_ignore_ascii_case(&other.qname);
        }
        self.qname == other.qname
    }

    fn reference_prefix(&self) -> &'static str {
        match (self.reference, self.mutable) {
            (true, true) => "&mut ",
            (true, false) => "&",
            _ => "",
        }
    }

    /// Serialized form, the inverse of [`parse_move_type`].
    pub fn signature(&self) -> String {
        let mut out = String::from(self.reference_prefix());
        out.push_str(&self.qname);
        if !self.type_args.is_empty() {
            let args: Vec<String> = self.type_args.iter().map(|t| t.signature()).collect();
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        out
    }

    /// Like [`signature`](Self::signature) but with built-in keywords lowercased,
    /// so `U64` and `u64` produce the same string.
    pub fn normalized_signature(&self) -> String {
        let mut out = String::from(self.reference_prefix());
        out.push_str(&normalize_builtin(&self.qname));
        if !self.type_args.is_empty() {
            let args: Vec<String> = self
                .type_args
                .iter()
                .map(|t| t.normalized_signature())
                .collect();
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        out
    }

    /// Replace generic placeholders with the types bound in `ctx`.
    ///
    /// Returns a new descriptor; `self` is left untouched.
    pub fn apply_type_args(&self, ctx: &TypeContext) -> TypeDescriptor {
        if let Some(replacement) = ctx.get(&self.qname) {
            let mut replaced = replacement.clone();
            if self.reference {
                replaced.reference = true;
                replaced.mutable = self.mutable;
            }
            return replaced;
        }
        if ctx.is_empty() || self.type_args.is_empty() {
            return self.clone();
        }
        self.apply(
            self.type_args
                .iter()
                .map(|arg| arg.apply_type_args(ctx))
                .collect(),
        )
    }

    /// Context binding `T0..Tn` to this descriptor's own type arguments.
    pub fn type_arg_context(&self) -> TypeContext {
        self.type_args
            .iter()
            .enumerate()
            .map(|(i, arg)| (format!("T{i}"), arg.clone()))
            .collect()
    }

    /// Every non-built-in qualified name this type depends on, itself included.
    ///
    /// Type arguments come before the type that uses them.
    pub fn depended_types(&self) -> Vec<String> {
        let mut out = IndexSet::new();
        self.collect_depended(&mut out);
        out.into_iter().collect()
    }

    fn collect_depended(&self, out: &mut IndexSet<String>) {
        if self.is_vector() {
            if let Some(element) = self.type_args.first() {
                element.collect_depended(out);
            }
            return;
        }
        if is_builtin(&self.qname) || self.qname == STRING_TYPE {
            return;
        }
        // bare placeholders and other unqualified tokens
        if !self.qname.contains(SPLITTER) {
            return;
        }
        for arg in &self.type_args {
            arg.collect_depended(out);
        }
        out.insert(self.qname.clone());
    }

    pub fn is_vector(&self) -> bool {
        self.qname.eq_ignore_ascii_case(VECTOR_STR)
    }

    /// Whether a wildcard appears anywhere in the tree.
    pub fn exist_any_type(&self) -> bool {
        self.qname == ANY_TYPE || self.type_args.iter().any(|t| t.exist_any_type())
    }

    /// A bare generic placeholder such as `T0`.
    pub fn is_type_parameter(&self) -> bool {
        !self.qname.contains(SPLITTER)
            && self.qname.len() > 1
            && self.qname.starts_with('T')
            && self.qname[1..].chars().all(|c| c.is_ascii_digit())
    }

    /// Last segment of the qualified name.
    pub fn name(&self) -> &str {
        self.qname.rsplit(SPLITTER).next().unwrap_or(&self.qname)
    }

    /// Module segment, if the name is qualified.
    pub fn module(&self) -> Option<&str> {
        let parts: Vec<&str> = self.qname.split(SPLITTER).collect();
        (parts.len() >= 2).then(|| parts[parts.len() - 2])
    }

    /// Account segment, if the name is qualified.
    pub fn account(&self) -> Option<&str> {
        self.qname
            .contains(SPLITTER)
            .then(|| self.qname.split(SPLITTER).next())
            .flatten()
    }

    /// Owned, non-reference copy.
    pub fn dereferenced(&self) -> TypeDescriptor {
        Self {
            reference: false,
            mutable: false,
            ..self.clone()
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

impl FromStr for TypeDescriptor {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_move_type(s)
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.signature())
    }
}

impl<'de> Deserialize<'de> for TypeDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_move_type(&s).map_err(serde::de::Error::custom)
    }
}
