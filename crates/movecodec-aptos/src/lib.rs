//! # movecodec-aptos
//!
//! Aptos support for movecodec:
//! - translation of fullnode REST module ABIs into the normalized model
//! - [`AptosChainAdapter`]: resource envelopes, signer stripping, event discovery
//! - [`AptosCoder`]: events, resources, entry function payloads, write sets
//! - `remote` (feature `remote`): fullnode module fetcher and resource client

pub mod abi;
pub mod adapter;
pub mod coder;
pub mod translate;

#[cfg(feature = "remote")]
pub mod remote;

pub use abi::{EntryFunctionPayload, MoveModuleAbi, MoveModuleBytecode};
pub use adapter::AptosChainAdapter;
pub use coder::{AptosCoder, DecodedResourceChange, IntoTypeDescriptor, TypedFunctionPayload};

#[cfg(feature = "remote")]
pub use remote::{AccountResourceClient, AptosRestClient, AptosRestFetcher, RemoteError};
