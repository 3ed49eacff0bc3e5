//! Aptos fullnode REST shapes: module ABIs, resources, events, payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /v1/accounts/{addr}/modules` element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveModuleBytecode {
    #[serde(default)]
    pub bytecode: Option<String>,
    /// Absent for modules published without metadata.
    #[serde(default)]
    pub abi: Option<MoveModuleAbi>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveModuleAbi {
    pub address: String,
    pub name: String,
    #[serde(default)]
    pub friends: Vec<String>,
    #[serde(default)]
    pub exposed_functions: Vec<MoveFunctionAbi>,
    #[serde(default)]
    pub structs: Vec<MoveStructAbi>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericTypeParam {
    #[serde(default)]
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveFunctionAbi {
    pub name: String,
    /// `public`, `private` or `friend`.
    pub visibility: String,
    #[serde(default)]
    pub is_entry: bool,
    #[serde(default)]
    pub is_view: bool,
    #[serde(default)]
    pub generic_type_params: Vec<GenericTypeParam>,
    pub params: Vec<String>,
    #[serde(rename = "return")]
    pub returns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveStructAbi {
    pub name: String,
    #[serde(default)]
    pub is_native: bool,
    /// Module events (`#[event]`), reported by newer fullnodes.
    #[serde(default)]
    pub is_event: bool,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub generic_type_params: Vec<GenericTypeParam>,
    pub fields: Vec<MoveStructFieldAbi>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveStructFieldAbi {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
}

/// Entry function payload as it appears in a user transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFunctionPayload {
    /// `account::module::function`.
    pub function: String,
    #[serde(default)]
    pub type_arguments: Vec<String>,
    #[serde(default)]
    pub arguments: Vec<Value>,
}
