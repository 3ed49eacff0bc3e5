//! Chain-agnostic module schema.
//!
//! Each chain translator turns its own ABI response into these types once;
//! the registry, the value codec and the dependency resolver only ever see
//! this model.

use crate::address::{module_qname, SPLITTER};
use crate::types::TypeDescriptor;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InternalMoveModule {
    pub address: String,
    pub name: String,
    #[serde(default)]
    pub structs: Vec<InternalMoveStruct>,
    #[serde(default)]
    pub functions: Vec<InternalMoveFunction>,
    #[serde(default)]
    pub enums: Vec<InternalMoveEnum>,
}

impl InternalMoveModule {
    /// `account::module` with the account canonicalized.
    pub fn qname(&self) -> String {
        module_qname(&self.address, &self.name)
    }

    /// Fully qualified name of a member of this module.
    pub fn member_qname(&self, member: &str) -> String {
        format!("{}{SPLITTER}{member}", self.qname())
    }

    pub fn find_struct(&self, name: &str) -> Option<&InternalMoveStruct> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn find_function(&self, name: &str) -> Option<&InternalMoveFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InternalMoveTypeParam {
    /// Ability constraints (`copy`, `drop`, `store`, `key`).
    #[serde(default)]
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InternalMoveField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: TypeDescriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InternalMoveStruct {
    pub name: String,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub type_params: Vec<InternalMoveTypeParam>,
    pub fields: Vec<InternalMoveField>,
    #[serde(default)]
    pub is_native: bool,
    #[serde(default)]
    pub is_event: bool,
}

impl InternalMoveStruct {
    pub fn has_ability(&self, ability: &str) -> bool {
        self.abilities.iter().any(|a| a.eq_ignore_ascii_case(ability))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InternalMoveFunctionVisibility {
    Public,
    Private,
    Friend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InternalMoveFunction {
    pub name: String,
    pub visibility: InternalMoveFunctionVisibility,
    #[serde(default)]
    pub is_entry: bool,
    #[serde(default)]
    pub is_view: bool,
    #[serde(default)]
    pub type_params: Vec<InternalMoveTypeParam>,
    pub params: Vec<TypeDescriptor>,
    #[serde(rename = "return")]
    pub returns: Vec<TypeDescriptor>,
}

/// Enums are reflected for dependency tracking and binary layouts; the JSON
/// value codec passes their values through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InternalMoveEnum {
    pub name: String,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub type_params: Vec<InternalMoveTypeParam>,
    pub variants: IndexMap<String, Vec<InternalMoveField>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_qnames_are_canonical() {
        let module = InternalMoveModule {
            address: "0x0000000000000000000000000000000000000000000000000000000000000001".into(),
            name: "coin".into(),
            structs: vec![],
            functions: vec![],
            enums: vec![],
        };
        assert_eq!(module.qname(), "0x1::coin");
        assert_eq!(module.member_qname("Coin"), "0x1::coin::Coin");
    }

    #[test]
    fn deserializes_from_json() {
        let json = serde_json::json!({
            "address": "0x1",
            "name": "coin",
            "structs": [{
                "name": "Coin",
                "abilities": ["store"],
                "type_params": [{"constraints": []}],
                "fields": [{"name": "value", "type": "u64"}]
            }],
            "functions": [{
                "name": "value",
                "visibility": "public",
                "params": ["&0x1::coin::Coin<T0>"],
                "return": ["u64"]
            }]
        });
        let module: InternalMoveModule = serde_json::from_value(json).unwrap();
        let coin = module.find_struct("Coin").unwrap();
        assert!(coin.has_ability("STORE"));
        assert_eq!(coin.fields[0].type_.qname, "u64");
        let f = module.find_function("value").unwrap();
        assert!(f.params[0].reference);
        assert_eq!(f.visibility, InternalMoveFunctionVisibility::Public);
    }
}
