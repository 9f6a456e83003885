//! # Standard ABI Decoding
//!
//! Inverse of [`super::encode`]. Decoding is strict: every offset and length
//! is bounds-checked against the input before it is followed, and padding
//! bytes must be zero (or a proper sign extension for `intN`). A payload
//! that decodes successfully re-encodes to the same bytes, up to the
//! placement of tail data.

use alloy_primitives::{Address, I256, U256};

use super::encode::int_fits;
use super::{AbiType, AbiValue};
use crate::error::DecodeError;
use crate::schema::Schema;

/// Decode `data` as the parameter list `types`.
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
    let types: Vec<&AbiType> = types.iter().collect();
    decode_sequence(&types, data, 0)
}

/// Decode `data` against a schema declaration such as `"uint256 eventId, string note"`.
pub fn decode_values(schema: &str, data: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
    let schema = Schema::parse(schema)?;
    decode(&schema.types(), data)
}

fn decode_sequence(
    types: &[&AbiType],
    data: &[u8],
    base: usize,
) -> Result<Vec<AbiValue>, DecodeError> {
    let mut values = Vec::with_capacity(types.len());
    let mut cursor = base;
    for ty in types {
        if ty.is_dynamic() {
            let relative = read_usize(data, cursor)?;
            let start = base
                .checked_add(relative)
                .filter(|start| *start <= data.len())
                .ok_or_else(|| DecodeError::InvalidOffset(relative.to_string()))?;
            values.push(decode_value(ty, data, start)?);
            cursor += 32;
        } else {
            values.push(decode_value(ty, data, cursor)?);
            cursor = ty
                .head_size()
                .and_then(|size| cursor.checked_add(size))
                .ok_or_else(|| DecodeError::InvalidOffset(ty.to_string()))?;
        }
    }
    Ok(values)
}

fn decode_value(ty: &AbiType, data: &[u8], at: usize) -> Result<AbiValue, DecodeError> {
    match ty {
        AbiType::Uint(bits) => {
            let value = U256::from_be_bytes(read_word(data, at)?);
            if value.bit_len() > *bits {
                return Err(DecodeError::InvalidPadding(ty.to_string()));
            }
            Ok(AbiValue::Uint(value))
        }
        AbiType::Int(bits) => {
            let value = I256::from_raw(U256::from_be_bytes(read_word(data, at)?));
            if !int_fits(*bits, &value) {
                return Err(DecodeError::InvalidPadding(ty.to_string()));
            }
            Ok(AbiValue::Int(value))
        }
        AbiType::Bool => {
            let word = read_word(data, at)?;
            match (word[..31].iter().all(|b| *b == 0), word[31]) {
                (true, 0) => Ok(AbiValue::Bool(false)),
                (true, 1) => Ok(AbiValue::Bool(true)),
                _ => Err(DecodeError::InvalidPadding(ty.to_string())),
            }
        }
        AbiType::Address => {
            let word = read_word(data, at)?;
            if word[..12].iter().any(|b| *b != 0) {
                return Err(DecodeError::InvalidPadding(ty.to_string()));
            }
            Ok(AbiValue::Address(Address::from_slice(&word[12..])))
        }
        AbiType::FixedBytes(len) => {
            let word = read_word(data, at)?;
            if word[*len..].iter().any(|b| *b != 0) {
                return Err(DecodeError::InvalidPadding(ty.to_string()));
            }
            Ok(AbiValue::FixedBytes(word[..*len].to_vec()))
        }
        AbiType::Bytes => Ok(AbiValue::Bytes(read_dynamic_bytes(data, at)?.to_vec())),
        AbiType::String => {
            let bytes = read_dynamic_bytes(data, at)?;
            String::from_utf8(bytes.to_vec())
                .map(AbiValue::String)
                .map_err(|_| DecodeError::InvalidUtf8)
        }
        AbiType::Array(inner) => {
            let len = read_usize(data, at)?;
            let start = at + 32;
            check_elements_fit(inner, len, data, start)?;
            decode_sequence(&vec![&**inner; len], data, start).map(AbiValue::Array)
        }
        AbiType::FixedArray(inner, len) => {
            check_elements_fit(inner, *len, data, at)?;
            decode_sequence(&vec![&**inner; *len], data, at).map(AbiValue::Array)
        }
        AbiType::Tuple(components) => {
            let components: Vec<&AbiType> = components.iter().collect();
            decode_sequence(&components, data, at).map(AbiValue::Tuple)
        }
    }
}

/// Each element needs at least its head words; reject lengths the remaining
/// data cannot possibly hold before allocating.
fn check_elements_fit(
    inner: &AbiType,
    len: usize,
    data: &[u8],
    start: usize,
) -> Result<(), DecodeError> {
    let min_size = inner
        .head_size()
        .and_then(|size| size.checked_mul(len))
        .ok_or_else(|| DecodeError::InvalidOffset(len.to_string()))?;
    if min_size > data.len().saturating_sub(start) {
        return Err(DecodeError::InvalidOffset(len.to_string()));
    }
    Ok(())
}

fn read_word(data: &[u8], at: usize) -> Result<[u8; 32], DecodeError> {
    let slice = read_slice(data, at, 32)?;
    let mut word = [0u8; 32];
    word.copy_from_slice(slice);
    Ok(word)
}

fn read_slice(data: &[u8], at: usize, len: usize) -> Result<&[u8], DecodeError> {
    at.checked_add(len)
        .and_then(|end| data.get(at..end))
        .ok_or(DecodeError::Truncated {
            offset: at,
            needed: len,
            available: data.len(),
        })
}

/// Read a word that must hold an offset or length no larger than the data.
fn read_usize(data: &[u8], at: usize) -> Result<usize, DecodeError> {
    let value = U256::from_be_bytes(read_word(data, at)?);
    usize::try_from(value)
        .ok()
        .filter(|v| *v <= data.len())
        .ok_or_else(|| DecodeError::InvalidOffset(value.to_string()))
}

fn read_dynamic_bytes(data: &[u8], at: usize) -> Result<&[u8], DecodeError> {
    let len = read_usize(data, at)?;
    read_slice(data, at + 32, len)
}
