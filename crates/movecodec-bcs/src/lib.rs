//! # movecodec-bcs
//!
//! Binary (BCS) support for Move values: [`BcsSchemaBuilder`] compiles a
//! type descriptor into a [`BinaryLayout`] once, then decodes bytes into the
//! JSON shape a node would have returned, or encodes that JSON back.

pub mod builder;
pub mod encoding;
pub mod layout;
pub mod reader;
pub mod writer;

pub use builder::BcsSchemaBuilder;
pub use encoding::Encoding;
pub use layout::{BinaryLayout, FieldLayout};
pub use reader::{read_value, BcsReader};
pub use writer::{to_bytes, write_uleb128, write_value};
