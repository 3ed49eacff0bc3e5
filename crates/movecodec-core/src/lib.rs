//! # movecodec-core
//!
//! Move type system primitives shared by every movecodec crate: the
//! [`TypeDescriptor`] tree and its parser, the wildcard matcher, the
//! normalized module model, host values, and the chain adapter traits.

pub mod adapter;
pub mod address;
pub mod chain;
pub mod error;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod types;
pub mod value;

pub use adapter::{ChainAdapter, ModuleFetcher, OfflineFetcher, RawModule};
pub use address::{account_address_string, account_type_string, SPLITTER};
pub use chain::ChainFamily;
pub use error::{
    BcsError, CodegenError, DecodeError, FetchError, RegistryError, TranslateError,
    TypeParseError,
};
pub use matcher::match_type;
pub use model::{
    InternalMoveEnum, InternalMoveField, InternalMoveFunction, InternalMoveFunctionVisibility,
    InternalMoveModule, InternalMoveStruct, InternalMoveTypeParam,
};
pub use parser::parse_move_type;
pub use types::{TypeContext, TypeDescriptor, ANY_TYPE};
pub use value::{parse_big_int, DecodedStruct, MoveValue};

pub use alloy_primitives::U256;
