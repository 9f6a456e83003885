//! # Standard ABI Encoding
//!
//! Head/tail encoding as specified by the Solidity ABI: every value occupies
//! whole 32-byte words; static values sit inline in the head, dynamic values
//! (`bytes`, `string`, `T[]`, and aggregates containing them) are placed in
//! the tail and referenced by a head word holding their byte offset from the
//! start of the enclosing sequence.
//!
//! This is the encoding of attestation payloads and contract calldata. UID
//! derivation uses the packed variant in [`super::packed`] instead.

use alloy_primitives::{I256, U256};

use super::{AbiType, AbiValue};
use crate::error::{EncodeError, SchemaMismatch};
use crate::schema::Schema;

/// Encode `values` as the parameter list `types`, like `abi.encode(v1, ..., vn)`.
///
/// # Errors
///
/// [`SchemaMismatch::Count`] when the lengths differ; otherwise any
/// [`EncodeError`] raised by an individual value.
pub fn encode(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
    if types.len() != values.len() {
        return Err(SchemaMismatch::Count {
            expected: types.len(),
            actual: values.len(),
        }
        .into());
    }
    let types: Vec<&AbiType> = types.iter().collect();
    let mut out = Vec::new();
    encode_sequence(&types, values, &mut out)?;
    Ok(out)
}

/// Encode positional values against a schema declaration such as
/// `"uint256 eventId, uint8 voteIndex"`.
pub fn encode_values(schema: &str, values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
    let schema = Schema::parse(schema)?;
    encode(&schema.types(), values)
}

fn encode_sequence(
    types: &[&AbiType],
    values: &[AbiValue],
    out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    let head_len = types
        .iter()
        .try_fold(0usize, |acc, t| acc.checked_add(t.head_size()?))
        .ok_or_else(|| {
            let types: Vec<String> = types.iter().map(ToString::to_string).collect();
            EncodeError::Unsupported(format!("head of ({}) overflows", types.join(",")))
        })?;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (ty, value) in types.iter().zip(values) {
        if ty.is_dynamic() {
            push_usize(&mut head, head_len + tail.len());
            encode_value(ty, value, &mut tail)?;
        } else {
            encode_value(ty, value, &mut head)?;
        }
    }

    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Ok(())
}

pub(crate) fn encode_value(
    ty: &AbiType,
    value: &AbiValue,
    out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    match (ty, value) {
        (AbiType::Uint(bits), AbiValue::Uint(v)) => {
            check_uint(*bits, v)?;
            out.extend_from_slice(&v.to_be_bytes::<32>());
        }
        (AbiType::Int(bits), AbiValue::Int(v)) => {
            check_int(*bits, v)?;
            out.extend_from_slice(&v.to_be_bytes::<32>());
        }
        (AbiType::Bool, AbiValue::Bool(b)) => {
            out.extend_from_slice(&[0u8; 31]);
            out.push(u8::from(*b));
        }
        (AbiType::Address, AbiValue::Address(a)) => {
            out.extend_from_slice(&[0u8; 12]);
            out.extend_from_slice(a.as_slice());
        }
        (AbiType::FixedBytes(len), AbiValue::FixedBytes(bytes)) => {
            check_len(ty, *len, bytes.len())?;
            pad_right(out, bytes);
        }
        (AbiType::Bytes, AbiValue::Bytes(bytes)) => {
            push_usize(out, bytes.len());
            pad_right(out, bytes);
        }
        (AbiType::String, AbiValue::String(s)) => {
            push_usize(out, s.len());
            pad_right(out, s.as_bytes());
        }
        (AbiType::Array(inner), AbiValue::Array(items)) => {
            push_usize(out, items.len());
            encode_sequence(&vec![&**inner; items.len()], items, out)?;
        }
        (AbiType::FixedArray(inner, len), AbiValue::Array(items)) => {
            check_len(ty, *len, items.len())?;
            encode_sequence(&vec![&**inner; items.len()], items, out)?;
        }
        (AbiType::Tuple(components), AbiValue::Tuple(items)) => {
            check_len(ty, components.len(), items.len())?;
            let components: Vec<&AbiType> = components.iter().collect();
            encode_sequence(&components, items, out)?;
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

/// Reject unsigned values wider than `bits`.
pub(crate) fn check_uint(bits: usize, value: &U256) -> Result<(), EncodeError> {
    if value.bit_len() > bits {
        return Err(EncodeError::Overflow {
            ty: format!("uint{bits}"),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Reject signed values outside `[-2^(bits-1), 2^(bits-1) - 1]`.
pub(crate) fn check_int(bits: usize, value: &I256) -> Result<(), EncodeError> {
    if !int_fits(bits, value) {
        return Err(EncodeError::Overflow {
            ty: format!("int{bits}"),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A two's complement value fits in `bits` iff every bit from `bits - 1`
/// upward equals the sign bit.
pub(crate) fn int_fits(bits: usize, value: &I256) -> bool {
    if bits >= 256 {
        return true;
    }
    let high = U256::MAX << (bits - 1);
    let masked = value.into_raw() & high;
    masked == U256::ZERO || masked == high
}

fn check_len(ty: &AbiType, expected: usize, actual: usize) -> Result<(), EncodeError> {
    if expected != actual {
        return Err(EncodeError::LengthMismatch {
            ty: ty.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn push_usize(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&U256::from(value).to_be_bytes::<32>());
}

/// Append `bytes` followed by zeros up to the next word boundary.
fn pad_right(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
    let rem = bytes.len() % 32;
    if rem != 0 {
        out.resize(out.len() + 32 - rem, 0);
    }
}
