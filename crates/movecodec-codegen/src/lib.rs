//! # movecodec-codegen
//!
//! Dependency resolution for Move binding generation. Starting from local
//! ABI files, [`DependencyResolver`] discovers every foreign account the
//! modules reference, fetches them until the set is closed, and hands the
//! resulting output units to a [`CodegenSink`].

pub mod imports;
pub mod resolver;
pub mod sink;

pub use imports::{AccountImports, AccountRegister, SYSTEM_ACCOUNTS};
pub use resolver::{DependencyResolver, ResolvedAccount, ResolverState};
pub use sink::{CodegenSink, ManifestSink, MemorySink};
