//! # Packed ABI Encoding
//!
//! The non-standard mode behind Solidity's `abi.encodePacked`: elementary
//! values are concatenated at their natural width with no padding and no
//! length prefixes. Array elements are the exception and are padded to a
//! full word each, as Solidity does.
//!
//! Packed encoding is ambiguous for adjacent dynamic values and is only used
//! where the layout is fixed, most notably schema UID derivation over
//! `(string, address, bool)`.

use super::encode::{check_int, check_uint, encode_value};
use super::{AbiType, AbiValue};
use crate::error::{EncodeError, SchemaMismatch};

/// Encode `values` as `abi.encodePacked(v1, ..., vn)` would.
///
/// # Errors
///
/// Tuples, and arrays whose element type is dynamic or a tuple, have no
/// packed encoding and yield [`EncodeError::Unsupported`].
pub fn encode_packed(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
    if types.len() != values.len() {
        return Err(SchemaMismatch::Count {
            expected: types.len(),
            actual: values.len(),
        }
        .into());
    }
    let mut out = Vec::new();
    for (ty, value) in types.iter().zip(values) {
        encode_packed_value(ty, value, &mut out)?;
    }
    Ok(out)
}

fn encode_packed_value(ty: &AbiType, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match (ty, value) {
        (AbiType::Uint(bits), AbiValue::Uint(v)) => {
            check_uint(*bits, v)?;
            out.extend_from_slice(&v.to_be_bytes::<32>()[32 - bits / 8..]);
        }
        (AbiType::Int(bits), AbiValue::Int(v)) => {
            check_int(*bits, v)?;
            out.extend_from_slice(&v.to_be_bytes::<32>()[32 - bits / 8..]);
        }
        (AbiType::Bool, AbiValue::Bool(b)) => out.push(u8::from(*b)),
        (AbiType::Address, AbiValue::Address(a)) => out.extend_from_slice(a.as_slice()),
        (AbiType::FixedBytes(len), AbiValue::FixedBytes(bytes)) => {
            if bytes.len() != *len {
                return Err(EncodeError::LengthMismatch {
                    ty: ty.to_string(),
                    expected: *len,
                    actual: bytes.len(),
                });
            }
            out.extend_from_slice(bytes);
        }
        (AbiType::Bytes, AbiValue::Bytes(bytes)) => out.extend_from_slice(bytes),
        (AbiType::String, AbiValue::String(s)) => out.extend_from_slice(s.as_bytes()),
        (AbiType::Array(inner) | AbiType::FixedArray(inner, _), AbiValue::Array(items)) => {
            if inner.is_dynamic() || matches!(**inner, AbiType::Tuple(_) | AbiType::FixedArray(..)) {
                return Err(EncodeError::Unsupported(format!("packed encoding of {ty}")));
            }
            if let AbiType::FixedArray(_, len) = ty {
                if items.len() != *len {
                    return Err(EncodeError::LengthMismatch {
                        ty: ty.to_string(),
                        expected: *len,
                        actual: items.len(),
                    });
                }
            }
            for item in items {
                encode_value(inner, item, out)?;
            }
        }
        (AbiType::Tuple(_), _) => {
            return Err(EncodeError::Unsupported(format!("packed encoding of {ty}")));
        }
        _ => {
            return Err(EncodeError::TypeMismatch {
                expected: ty.to_string(),
                found: value.kind().to_string(),
            })
        }
    }
    Ok(())
}
