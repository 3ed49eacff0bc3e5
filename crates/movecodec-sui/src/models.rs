//! Sui JSON-RPC shapes consumed and produced by [`SuiCoder`](crate::SuiCoder).

use movecodec_core::MoveValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A `MoveCall` command of a programmable transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCallTransaction {
    pub package: String,
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub type_arguments: Vec<String>,
    /// `{"Input": n}`, `{"Result": n}`, `{"NestedResult": [n, m]}` or `"GasCoin"`.
    #[serde(default)]
    pub arguments: Vec<Value>,
}

impl MoveCallTransaction {
    /// `package::module::function`.
    pub fn function_qname(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }

    /// Transaction input index, when the argument refers to one.
    pub fn input_index(argument: &Value) -> Option<usize> {
        argument
            .get("Input")
            .and_then(Value::as_u64)
            .and_then(|i| usize::try_from(i).ok())
    }
}

/// A transaction input: `{"type": "pure", "value": ..}` or `{"type": "object", ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CallArg {
    Pure {
        #[serde(default, rename = "valueType")]
        value_type: Option<String>,
        value: Value,
    },
    Object {
        #[serde(flatten)]
        object: Map<String, Value>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct TypedMoveCall {
    #[serde(flatten)]
    pub payload: MoveCallTransaction,
    pub arguments_decoded: Vec<MoveValue>,
}

/// `sui_devInspectTransactionBlock` result, trimmed to what decoding needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevInspectResults {
    #[serde(default)]
    pub results: Option<Vec<ExecutionResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// `(bcs bytes, type signature)` pairs.
    #[serde(default)]
    pub return_values: Option<Vec<(Vec<u8>, String)>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypedDevInspectResults {
    #[serde(flatten)]
    pub raw: DevInspectResults,
    /// One entry per return value; `Null` for a command without return values.
    pub results_decoded: Vec<MoveValue>,
}
