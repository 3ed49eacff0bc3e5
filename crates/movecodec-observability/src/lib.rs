//! # movecodec-observability
//!
//! `tracing` subscriber setup shared by the movecodec binaries.
//!
//! Library crates only emit events (`debug!` on module fetches and
//! registration, `warn!` when a batch item is skipped, `info!` while the
//! dependency resolver downloads accounts). Installing a subscriber is left
//! to the host; [`init_tracing`] is the one the CLI uses.
//!
//! Levels can be set per component, where a component is a crate name such
//! as `movecodec-registry` (dashes are accepted).

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, try_init_tracing, LogConfig};
