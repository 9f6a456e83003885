//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types returned by the core. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every core error is a defect in the caller's input: nothing here is
//!   transient and nothing is retried.
//! - Mismatch errors carry both the expected and the actual side verbatim.
//! - Encoding errors name the ABI type that rejected the value.

use thiserror::Error;

/// Top-level error type for the core.
#[derive(Error, Debug)]
pub enum EasError {
    /// The schema string is malformed.
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// Values do not match the declared schema.
    #[error("schema mismatch: {0}")]
    Mismatch(#[from] SchemaMismatch),

    /// A value cannot be represented in its declared ABI type.
    #[error("encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// ABI data could not be decoded.
    #[error("decoding error: {0}")]
    Decode(#[from] DecodeError),
}

/// Error raised while normalizing or parsing a schema string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema declares no fields.
    #[error("schema must declare at least one field")]
    Empty,

    /// Parentheses do not balance.
    #[error("unbalanced parentheses in {0:?}")]
    UnbalancedParens(String),

    /// A type token does not name a supported ABI type.
    #[error("unknown ABI type {0:?}")]
    UnknownType(String),

    /// A field declaration could not be parsed.
    #[error("invalid field declaration {0:?}")]
    InvalidField(String),
}

/// Values or a record shape disagree with the declared schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaMismatch {
    /// The number of values differs from the number of declared types.
    #[error("schema declares {expected} fields but {actual} values were supplied")]
    Count {
        /// Number of types declared by the schema.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A record's reflected schema differs from the declared schema.
    #[error("expected schema {expected:?} but record reflects {actual:?}")]
    Shape {
        /// The declared schema string.
        expected: String,
        /// The schema string reflected from the record.
        actual: String,
    },
}

/// A value cannot be encoded as its declared ABI type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The value does not fit the declared bit width.
    #[error("value {value} overflows {ty}")]
    Overflow {
        /// The declared ABI type.
        ty: String,
        /// The rejected value.
        value: String,
    },

    /// The value kind does not match the declared ABI type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The declared ABI type.
        expected: String,
        /// The kind of value supplied.
        found: String,
    },

    /// A fixed-length value has the wrong number of elements or bytes.
    #[error("{ty} expects length {expected}, got {actual}")]
    LengthMismatch {
        /// The declared ABI type.
        ty: String,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// The encoding mode cannot represent the value.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The schema string is malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Values do not match the declared schema.
    #[error(transparent)]
    Mismatch(#[from] SchemaMismatch),
}

/// ABI data could not be decoded against the declared types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The data ends before the value it declares.
    #[error("data truncated: needed {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        /// Offset of the read.
        offset: usize,
        /// Bytes needed from that offset.
        needed: usize,
        /// Total bytes available.
        available: usize,
    },

    /// An offset or length word points outside the data.
    #[error("invalid offset or length {0}")]
    InvalidOffset(String),

    /// Padding bytes of a word are not zero (or not a sign extension).
    #[error("invalid padding for {0}")]
    InvalidPadding(String),

    /// A `string` value is not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// The schema string is malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
