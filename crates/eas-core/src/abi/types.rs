//! # ABI Types
//!
//! `AbiType` is the resolved form of a Solidity type token. It drives both
//! encoders and the decoder: every encoding decision (head size, static vs
//! dynamic placement, padding) is made from the type, never from the value.

use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;
use crate::schema::parse_fields;

/// A resolved Ethereum ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// `uintN`, N in 8..=256 with step 8. Bare `uint` is `uint256`.
    Uint(usize),
    /// `intN`, N in 8..=256 with step 8. Bare `int` is `int256`.
    Int(usize),
    /// `bool`.
    Bool,
    /// `address` (20 bytes).
    Address,
    /// `bytesN`, N in 1..=32.
    FixedBytes(usize),
    /// Dynamic `bytes`.
    Bytes,
    /// Dynamic UTF-8 `string`.
    String,
    /// Dynamic-length array `T[]`.
    Array(Box<AbiType>),
    /// Fixed-length array `T[k]`.
    FixedArray(Box<AbiType>, usize),
    /// Tuple `(T1,...,Tn)`.
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Parse a single type token such as `uint256`, `bytes32[]` or
    /// `tuple(uint8 a, bool b)[2]`. Kind names are case-insensitive.
    ///
    /// Tuple components may carry names; they are discarded here. Use
    /// [`crate::Schema`] to keep them.
    pub fn parse(token: &str) -> Result<Self, SchemaError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SchemaError::InvalidField(String::new()));
        }
        if let Some(close) = tuple_close(token)? {
            let open = token.find('(').unwrap_or(0);
            let components = parse_fields(&token[open + 1..close])?;
            let base = AbiType::Tuple(components.into_iter().map(|f| f.ty).collect());
            return apply_suffixes(base, &token[close + 1..], token);
        }
        let (base, suffix) = match token.find('[') {
            Some(i) => (&token[..i], &token[i..]),
            None => (token, ""),
        };
        apply_suffixes(parse_elementary(base)?, suffix, token)
    }

    /// True for types encoded in the tail section behind an offset.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::Bytes | Self::String | Self::Array(_) => true,
            Self::FixedArray(inner, _) => inner.is_dynamic(),
            Self::Tuple(components) => components.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// Number of 32-byte words this type occupies in a head section, or
    /// `None` when a fixed-array length makes it overflow `usize`.
    pub fn head_words(&self) -> Option<usize> {
        if self.is_dynamic() {
            return Some(1);
        }
        match self {
            Self::FixedArray(inner, len) => inner.head_words()?.checked_mul(*len),
            Self::Tuple(components) => components
                .iter()
                .try_fold(0usize, |acc, c| acc.checked_add(c.head_words()?)),
            _ => Some(1),
        }
    }

    /// Head size in bytes, `None` on overflow.
    pub fn head_size(&self) -> Option<usize> {
        self.head_words()?.checked_mul(32)
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::Bool => f.write_str("bool"),
            Self::Address => f.write_str("address"),
            Self::FixedBytes(len) => write!(f, "bytes{len}"),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::Array(inner) => write!(f, "{inner}[]"),
            Self::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
            Self::Tuple(components) => {
                f.write_str("(")?;
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{component}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for AbiType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// If `token` opens with `(` or `tuple(`, return the index of the matching
/// close paren.
pub(crate) fn tuple_close(token: &str) -> Result<Option<usize>, SchemaError> {
    let open = if token.starts_with('(') {
        0
    } else if token
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("tuple("))
    {
        5
    } else {
        return Ok(None);
    };
    match matching_paren(token, open) {
        Some(close) => Ok(Some(close)),
        None => Err(SchemaError::UnbalancedParens(token.to_string())),
    }
}

/// Index of the `)` matching the `(` at byte index `open`.
pub(crate) fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a leading run of `[..]` groups off `rest`, returning the groups and
/// the remainder.
pub(crate) fn split_suffixes(rest: &str) -> (&str, &str) {
    let mut end = 0;
    let bytes = rest.as_bytes();
    while end < bytes.len() && bytes[end] == b'[' {
        match rest[end..].find(']') {
            Some(close) => end += close + 1,
            None => return (rest, ""),
        }
    }
    (&rest[..end], &rest[end..])
}

/// Wrap `base` in array types for each `[]` / `[k]` group of `suffix`.
pub(crate) fn apply_suffixes(
    mut base: AbiType,
    suffix: &str,
    token: &str,
) -> Result<AbiType, SchemaError> {
    let mut rest = suffix.trim();
    while !rest.is_empty() {
        let close = match (rest.starts_with('['), rest.find(']')) {
            (true, Some(close)) => close,
            _ => return Err(SchemaError::UnknownType(token.to_string())),
        };
        let len = rest[1..close].trim();
        base = if len.is_empty() {
            AbiType::Array(Box::new(base))
        } else {
            match parse_decimal(len) {
                Some(k) => AbiType::FixedArray(Box::new(base), k),
                None => return Err(SchemaError::UnknownType(token.to_string())),
            }
        };
        rest = rest[close + 1..].trim_start();
    }
    Ok(base)
}

fn parse_elementary(token: &str) -> Result<AbiType, SchemaError> {
    let unknown = || SchemaError::UnknownType(token.to_string());
    let lower = token.trim().to_ascii_lowercase();
    let ty = match lower.as_str() {
        "bool" => AbiType::Bool,
        "address" => AbiType::Address,
        "string" => AbiType::String,
        "bytes" => AbiType::Bytes,
        "uint" => AbiType::Uint(256),
        "int" => AbiType::Int(256),
        other => {
            if let Some(bits) = other.strip_prefix("uint") {
                AbiType::Uint(parse_width(bits).ok_or_else(unknown)?)
            } else if let Some(bits) = other.strip_prefix("int") {
                AbiType::Int(parse_width(bits).ok_or_else(unknown)?)
            } else if let Some(len) = other.strip_prefix("bytes") {
                match parse_decimal(len) {
                    Some(n) if (1..=32).contains(&n) => AbiType::FixedBytes(n),
                    _ => return Err(unknown()),
                }
            } else {
                return Err(unknown());
            }
        }
    };
    Ok(ty)
}

fn parse_width(bits: &str) -> Option<usize> {
    let n = parse_decimal(bits)?;
    (n % 8 == 0 && (8..=256).contains(&n)).then_some(n)
}

/// Plain decimal without sign or leading zeros.
fn parse_decimal(digits: &str) -> Option<usize> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
