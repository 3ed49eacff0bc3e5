//! Error types shared across the movecodec crates.

use thiserror::Error;

/// Malformed type signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    #[error("Empty type signature")]
    Empty,

    #[error("Unbalanced '{ch}' at position {position} in '{signature}'")]
    Unbalanced {
        signature: String,
        position: usize,
        ch: char,
    },

    #[error("Unclosed '<' in '{signature}'")]
    Unclosed { signature: String },

    #[error("Missing type name at position {position} in '{signature}'")]
    EmptyName { signature: String, position: usize },

    #[error("Unexpected trailing characters '{trailing}' in '{signature}'")]
    Trailing { signature: String, trailing: String },

    #[error("Not a valid Move address: {0}")]
    InvalidAddress(String),
}

/// Failure while translating a chain ABI into the normalized module model.
#[derive(Debug, Clone, Error)]
pub enum TranslateError {
    #[error("Module has no ABI")]
    MissingAbi,

    #[error("Missing field '{field}' in {context}")]
    MissingField { field: String, context: String },

    #[error("Invalid {context}: {reason}")]
    Invalid { context: String, reason: String },

    #[error("Type parse error: {0}")]
    TypeParse(#[from] TypeParseError),
}

/// Errors raised by a `ModuleFetcher`. Cloneable so a single failed fetch
/// can be delivered to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Transport error fetching {account}: {reason}")]
    Transport { account: String, reason: String },

    #[error("Account {account} not found")]
    NotFound { account: String },

    #[error("Module {account}::{module} not found")]
    ModuleNotFound { account: String, module: String },

    #[error("Invalid response for {account}: {reason}")]
    InvalidResponse { account: String, reason: String },
}

impl FetchError {
    /// The account the failed request targeted.
    pub fn account(&self) -> &str {
        match self {
            Self::Transport { account, .. }
            | Self::NotFound { account }
            | Self::ModuleNotFound { account, .. }
            | Self::InvalidResponse { account, .. } => account,
        }
    }

    /// Transport failures are worth retrying, missing accounts are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Errors from the schema registry and module loader.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("Type {qname} not found in account {account}")]
    UnresolvedType { qname: String, account: String },

    #[error("'{0}' is not a qualified type name")]
    NotQualified(String),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("ABI translation failed: {0}")]
    Translate(#[from] TranslateError),
}

/// Errors from the binary (BCS) layout compiler, reader and writer.
#[derive(Debug, Error)]
pub enum BcsError {
    #[error("Unexpected end of input at offset {offset}: need {needed} more bytes")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("{remaining} trailing bytes after decoding {type_}")]
    TrailingBytes { type_: String, remaining: usize },

    #[error("ULEB128 length overflow at offset {offset}")]
    Uleb128Overflow { offset: usize },

    #[error("Non-canonical ULEB128 at offset {offset}")]
    NonCanonicalUleb128 { offset: usize },

    #[error("Invalid bool byte {byte:#04x} at offset {offset}")]
    InvalidBool { byte: u8, offset: usize },

    #[error("Invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("Invalid enum variant {variant} for {type_}")]
    InvalidVariant { type_: String, variant: u64 },

    #[error("Invalid {encoding} input: {reason}")]
    InvalidEncoding { encoding: String, reason: String },

    #[error("Cannot encode {got} as {expected}")]
    InvalidValue { expected: String, got: String },

    #[error("Type {0} has no binary layout")]
    Unsupported(String),

    #[error("BCS serialization failed: {0}")]
    Serialize(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Errors that can occur while decoding or encoding a value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid integer {value} for type {type_}")]
    InvalidInteger { value: String, type_: String },

    #[error("Missing field '{field}' in {type_}")]
    MissingField { field: String, type_: String },

    #[error("Decoding error for {value} using type {expected}: {source}")]
    ArgumentFailed {
        value: String,
        expected: String,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("Expected {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Type {0} contains a wildcard and cannot be used for exact decoding")]
    AmbiguousType(String),

    #[error("Type parse error: {0}")]
    TypeParse(#[from] TypeParseError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Binary decode error: {0}")]
    Binary(#[from] BcsError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors from the code generation dependency resolver.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("Fetching modules for account {account} failed: {source}")]
    Fetch {
        account: String,
        #[source]
        source: FetchError,
    },

    #[error("Translating modules for account {account} failed: {source}")]
    Translate {
        account: String,
        #[source]
        source: TranslateError,
    },

    #[error("Account {account} returned no modules, dependency resolution cannot progress")]
    NoProgress { account: String },

    #[error("Code emission failed for {module}: {reason}")]
    Sink { module: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
