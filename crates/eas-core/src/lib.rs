//! # eas-core — Schema and ABI Primitives for the Ethereum Attestation Service
//!
//! This crate is the leaf of the workspace. It turns schema declarations and
//! structured data into the exact bytes the EAS contracts hash and store,
//! and performs no I/O.
//!
//! ## Components
//!
//! 1. **Normalization.** [`normalize()`] trims a declaration and strips
//!    parentheses enclosing all of it. The result is what gets hashed.
//!
//! 2. **Schema UIDs.** [`derive_schema_uid()`] is
//!    `keccak256(abi.encodePacked(schema, resolver, revocable))`, computed
//!    through the packed encoder.
//!
//! 3. **ABI codec.** [`encode_values()`], [`encode_packed()`] and
//!    [`decode_values()`] implement the Solidity ABI bit for bit over the
//!    [`AbiValue`] tagged union.
//!
//! 4. **Typed records.** [`AbiRecord`] types describe their fields with a
//!    [`SchemaDescriptor`]; [`encode_record()`] refuses to encode a record
//!    whose reflected schema differs from the declared one.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `eas-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - No logging; every failure is returned to the caller.

pub mod abi;
pub mod error;
pub mod record;
pub mod schema;
pub mod uid;

// Re-export primary types for ergonomic imports.
pub use abi::{
    decode, decode_values, encode, encode_packed, encode_values, values_from_json, AbiType,
    AbiValue,
};
pub use error::{DecodeError, EasError, EncodeError, SchemaError, SchemaMismatch};
pub use record::{
    encode_record, AbiRecord, FieldLayout, SchemaDescriptor, SchemaDescriptorBuilder,
    SchemaLayout,
};
pub use schema::{normalize, parse_schema, Schema, SchemaField};
pub use uid::{derive_schema_uid, SchemaDescription, SchemaUid};

/// Re-exported so downstream crates name the same primitive types.
pub use alloy_primitives::{Address, B256, I256, U256};
