//! Compiled binary layouts.

use std::sync::Arc;

/// Field name and layout, in declaration order.
pub type FieldLayout = (String, Arc<BinaryLayout>);

/// How one fully instantiated Move type is laid out in BCS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryLayout {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    /// 32 bytes. Also used for `signer`.
    Address,
    /// ULEB128 length, then UTF-8 bytes.
    String,
    /// ULEB128 length, then the elements.
    Vector(Arc<BinaryLayout>),
    Struct {
        qname: String,
        fields: Vec<FieldLayout>,
    },
    /// ULEB128 variant index, then that variant's fields.
    Enum {
        qname: String,
        variants: Vec<(String, Vec<FieldLayout>)>,
    },
}

impl BinaryLayout {
    /// Layout for a built-in keyword (case-insensitive).
    pub fn primitive(keyword: &str) -> Option<Self> {
        Some(match keyword.to_ascii_lowercase().as_str() {
            "bool" => Self::Bool,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "u256" => Self::U256,
            "address" | "signer" => Self::Address,
            _ => return None,
        })
    }

    /// Fixed encoded width, if any.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 => Some(1),
            Self::U16 => Some(2),
            Self::U32 => Some(4),
            Self::U64 => Some(8),
            Self::U128 => Some(16),
            Self::U256 | Self::Address => Some(32),
            Self::Struct { fields, .. } => fields
                .iter()
                .map(|(_, l)| l.fixed_size())
                .sum::<Option<usize>>(),
            Self::String | Self::Vector(_) | Self::Enum { .. } => None,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Bool => "bool".into(),
            Self::U8 => "u8".into(),
            Self::U16 => "u16".into(),
            Self::U32 => "u32".into(),
            Self::U64 => "u64".into(),
            Self::U128 => "u128".into(),
            Self::U256 => "u256".into(),
            Self::Address => "address".into(),
            Self::String => "0x1::string::String".into(),
            Self::Vector(inner) => format!("vector<{}>", inner.name()),
            Self::Struct { qname, .. } | Self::Enum { qname, .. } => qname.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sizes() {
        let coin = BinaryLayout::Struct {
            qname: "0x2::balance::Balance".into(),
            fields: vec![("value".into(), Arc::new(BinaryLayout::U64))],
        };
        assert_eq!(coin.fixed_size(), Some(8));
        let with_vec = BinaryLayout::Struct {
            qname: "0x1::ascii::String".into(),
            fields: vec![(
                "bytes".into(),
                Arc::new(BinaryLayout::Vector(Arc::new(BinaryLayout::U8))),
            )],
        };
        assert_eq!(with_vec.fixed_size(), None);
        assert_eq!(BinaryLayout::primitive("Signer"), Some(BinaryLayout::Address));
    }
}
