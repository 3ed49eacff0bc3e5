//! # movecodec-sui
//!
//! Sui support for movecodec: normalized module translation, the
//! [`SuiChainAdapter`], framework type overrides, and [`SuiCoder`] for
//! events, objects, dynamic fields, move calls and BCS return values.

pub mod adapter;
pub mod coder;
pub mod models;
pub mod overrides;
pub mod translate;

#[cfg(feature = "remote")]
pub mod remote;

pub use adapter::SuiChainAdapter;
pub use coder::SuiCoder;
pub use models::{
    CallArg, DevInspectResults, ExecutionResult, MoveCallTransaction, TypedDevInspectResults,
    TypedMoveCall,
};
pub use overrides::sui_overrides;

#[cfg(feature = "remote")]
pub use remote::{RemoteError, SuiRpcFetcher};
