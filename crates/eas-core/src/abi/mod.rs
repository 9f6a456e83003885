//! # Ethereum ABI — Types, Values, Encoders and Decoder
//!
//! - [`types`]: `AbiType`, parsed from Solidity type tokens.
//! - [`AbiValue`]: the tagged union of encodable values.
//! - [`encode()`] / [`encode_values()`]: standard head/tail encoding.
//! - [`encode_packed()`]: `abi.encodePacked` mode, used for UID hashing.
//! - [`decode()`] / [`decode_values()`]: strict inverse of `encode`.

pub mod types;

mod decode;
mod encode;
mod packed;
mod value;

pub use decode::{decode, decode_values};
pub use encode::{encode, encode_values};
pub use packed::encode_packed;
pub use types::AbiType;
pub use value::{values_from_json, AbiValue};
