//! # ABI Values
//!
//! `AbiValue` is a tagged union over everything the encoder accepts. The
//! encoder dispatches on the declared [`AbiType`] and checks that the value's
//! tag agrees with it; bit widths and lengths come from the type, so a
//! `Uint` carries no width of its own.
//!
//! ## JSON Bridge
//!
//! [`AbiValue::from_json()`] and [`AbiValue::to_json()`] convert to and from
//! `serde_json::Value` guided by the ABI type. Integers are rendered as
//! decimal strings so that 256-bit values survive JSON consumers that parse
//! numbers as doubles.

use alloy_primitives::{hex, Address, I256, U256};
use serde_json::Value;

use super::AbiType;
use crate::error::{EncodeError, SchemaMismatch};

/// A value to be ABI-encoded, or one produced by decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    /// Unsigned integer for any `uintN`.
    Uint(U256),
    /// Signed integer for any `intN`.
    Int(I256),
    /// Boolean.
    Bool(bool),
    /// 20-byte address.
    Address(Address),
    /// Raw bytes for `bytesN`. Length must equal N.
    FixedBytes(Vec<u8>),
    /// Dynamic `bytes`.
    Bytes(Vec<u8>),
    /// UTF-8 `string`.
    String(String),
    /// Elements of a `T[]` or `T[k]`.
    Array(Vec<AbiValue>),
    /// Components of a tuple.
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// Unsigned integer from a primitive.
    pub fn uint(value: u128) -> Self {
        Self::Uint(U256::from(value))
    }

    /// Signed integer from a primitive.
    pub fn int(value: i128) -> Self {
        let magnitude = I256::from_raw(U256::from(value.unsigned_abs()));
        Self::Int(if value < 0 { -magnitude } else { magnitude })
    }

    /// UTF-8 string.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Dynamic bytes.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(value.into())
    }

    /// Short name of the value's tag, used in mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Uint(_) => "uint",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Address(_) => "address",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
        }
    }

    /// Build a value of type `ty` from JSON.
    ///
    /// Integers accept JSON numbers or strings (decimal, or `0x` hex for
    /// unsigned). Byte types accept `0x` hex strings. Arrays and tuples
    /// accept JSON arrays. Range checks against the declared width happen
    /// at encode time.
    pub fn from_json(ty: &AbiType, json: &Value) -> Result<Self, EncodeError> {
        let mismatch = || EncodeError::TypeMismatch {
            expected: ty.to_string(),
            found: json_kind(json).to_string(),
        };
        let invalid = |raw: &str| EncodeError::Overflow {
            ty: ty.to_string(),
            value: raw.to_string(),
        };

        match ty {
            AbiType::Uint(_) => match json {
                Value::Number(n) => n
                    .as_u64()
                    .map(|v| Self::Uint(U256::from(v)))
                    .ok_or_else(|| invalid(&n.to_string())),
                Value::String(s) => s
                    .trim()
                    .parse::<U256>()
                    .map(Self::Uint)
                    .map_err(|_| invalid(s)),
                _ => Err(mismatch()),
            },
            AbiType::Int(_) => match json {
                Value::Number(n) => n
                    .as_i64()
                    .map(|v| Self::int(i128::from(v)))
                    .ok_or_else(|| invalid(&n.to_string())),
                Value::String(s) => I256::from_dec_str(s.trim())
                    .map(Self::Int)
                    .map_err(|_| invalid(s)),
                _ => Err(mismatch()),
            },
            AbiType::Bool => match json {
                Value::Bool(b) => Ok(Self::Bool(*b)),
                Value::String(s) if s == "true" => Ok(Self::Bool(true)),
                Value::String(s) if s == "false" => Ok(Self::Bool(false)),
                _ => Err(mismatch()),
            },
            AbiType::Address => match json {
                Value::String(s) => s
                    .trim()
                    .parse::<Address>()
                    .map(Self::Address)
                    .map_err(|_| invalid(s)),
                _ => Err(mismatch()),
            },
            AbiType::FixedBytes(len) => {
                let bytes = json_hex(json).ok_or_else(mismatch)?;
                if bytes.len() != *len {
                    return Err(EncodeError::LengthMismatch {
                        ty: ty.to_string(),
                        expected: *len,
                        actual: bytes.len(),
                    });
                }
                Ok(Self::FixedBytes(bytes))
            }
            AbiType::Bytes => json_hex(json).map(Self::Bytes).ok_or_else(mismatch),
            AbiType::String => match json {
                Value::String(s) => Ok(Self::String(s.clone())),
                _ => Err(mismatch()),
            },
            AbiType::Array(inner) => match json {
                Value::Array(items) => items
                    .iter()
                    .map(|item| Self::from_json(inner, item))
                    .collect::<Result<_, _>>()
                    .map(Self::Array),
                _ => Err(mismatch()),
            },
            AbiType::FixedArray(inner, len) => match json {
                Value::Array(items) if items.len() == *len => items
                    .iter()
                    .map(|item| Self::from_json(inner, item))
                    .collect::<Result<_, _>>()
                    .map(Self::Array),
                Value::Array(items) => Err(EncodeError::LengthMismatch {
                    ty: ty.to_string(),
                    expected: *len,
                    actual: items.len(),
                }),
                _ => Err(mismatch()),
            },
            AbiType::Tuple(components) => match json {
                Value::Array(items) if items.len() == components.len() => components
                    .iter()
                    .zip(items)
                    .map(|(component, item)| Self::from_json(component, item))
                    .collect::<Result<_, _>>()
                    .map(Self::Tuple),
                Value::Array(items) => Err(EncodeError::LengthMismatch {
                    ty: ty.to_string(),
                    expected: components.len(),
                    actual: items.len(),
                }),
                _ => Err(mismatch()),
            },
        }
    }

    /// Render as JSON. Integers become decimal strings, byte values `0x` hex,
    /// addresses their checksummed form.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Uint(v) => Value::String(v.to_string()),
            Self::Int(v) => Value::String(v.to_string()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Address(a) => Value::String(a.to_checksum(None)),
            Self::FixedBytes(b) | Self::Bytes(b) => Value::String(hex::encode_prefixed(b)),
            Self::String(s) => Value::String(s.clone()),
            Self::Array(items) | Self::Tuple(items) => {
                Value::Array(items.iter().map(AbiValue::to_json).collect())
            }
        }
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Build the positional values of `schema` from a JSON array, one element
/// per declared field.
pub fn values_from_json(schema: &str, json: &Value) -> Result<Vec<AbiValue>, EncodeError> {
    let types = crate::schema::Schema::parse(schema)?.types();
    let items = json.as_array().ok_or_else(|| EncodeError::TypeMismatch {
        expected: "array of field values".into(),
        found: json_kind(json).into(),
    })?;
    if items.len() != types.len() {
        return Err(SchemaMismatch::Count {
            expected: types.len(),
            actual: items.len(),
        }
        .into());
    }
    types
        .iter()
        .zip(items)
        .map(|(ty, item)| AbiValue::from_json(ty, item))
        .collect()
}

fn json_hex(json: &Value) -> Option<Vec<u8>> {
    match json {
        Value::String(s) => hex::decode(s.trim()).ok(),
        _ => None,
    }
}

fn json_kind(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
