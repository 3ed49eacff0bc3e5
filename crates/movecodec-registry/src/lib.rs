//! # movecodec-registry
//!
//! Schema registry for movecodec.
//!
//! ## Pieces
//! 1. **`ModuleRegistry`**: struct / function / enum maps keyed by qualified
//!    name, filled lazily per account through a `ModuleFetcher`, with
//!    concurrent misses coalesced into one fetch
//! 2. **`AbiDirectory`**: `<account>.json` ABI cache on disk, usable as a fetcher
//! 3. **`StaticFetcher`**: in-memory fetcher with request counting
//! 4. **`NormalizedAdapter`**: adapter for modules already in normalized form

pub mod abi_dir;
pub mod fetcher;
pub mod normalized;
pub mod registry;

pub use abi_dir::{read_abi_file, AbiDirectory, AbiFileError};
pub use fetcher::StaticFetcher;
pub use normalized::NormalizedAdapter;
pub use registry::ModuleRegistry;
