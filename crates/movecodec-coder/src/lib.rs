//! # movecodec-coder
//!
//! Converts chain JSON values to typed [`MoveValue`](movecodec_core::MoveValue)s
//! and back, driven by [`TypeDescriptor`](movecodec_core::TypeDescriptor)s and
//! the struct definitions held in a [`ModuleRegistry`](movecodec_registry::ModuleRegistry).
//!
//! Chain crates plug their framework-type quirks in as [`ValueOverride`]s.

pub mod coder;
pub mod overrides;
pub mod pool;

pub use coder::MoveCoder;
pub use overrides::{OverrideAction, OverrideSet, StringPassthrough, ValueOverride};
pub use pool::CoderPool;
