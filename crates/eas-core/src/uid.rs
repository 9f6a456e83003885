//! # Schema UIDs — Content-Addressed Schema Identifiers
//!
//! A schema is identified on chain by
//! `keccak256(abi.encodePacked(schema, resolver, revocable))`. The registry
//! contract computes this over the exact string it receives, so the client
//! must hash the same bytes it submits: the [`normalize`]d declaration.
//!
//! ## Invariant
//!
//! Derivation goes through [`encode_packed`] and never through ad-hoc byte
//! concatenation. Equal normalized inputs always produce equal UIDs.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{hex, keccak256, Address, B256};
use serde::{Deserialize, Serialize};

use crate::abi::{encode_packed, AbiType, AbiValue};
use crate::error::EasError;
use crate::schema::normalize;

/// The 32-byte identifier of a registered schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaUid(B256);

impl SchemaUid {
    /// The all-zero UID, used by the registry for "no such schema".
    pub const ZERO: Self = Self(B256::ZERO);

    /// Wrap a raw 32-byte digest.
    pub const fn new(bytes: B256) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }

    /// The digest as a `B256` word.
    pub fn as_b256(&self) -> B256 {
        self.0
    }

    /// True for [`SchemaUid::ZERO`].
    pub fn is_zero(&self) -> bool {
        self.0 == B256::ZERO
    }
}

impl From<B256> for SchemaUid {
    fn from(bytes: B256) -> Self {
        Self(bytes)
    }
}

impl From<SchemaUid> for B256 {
    fn from(uid: SchemaUid) -> Self {
        uid.0
    }
}

impl fmt::Display for SchemaUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_prefixed(self.0))
    }
}

impl FromStr for SchemaUid {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<B256>().map(Self)
    }
}

/// The inputs that identify a schema on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescription {
    /// The schema declaration, e.g. `"uint256 eventId, uint8 voteIndex"`.
    pub schema: String,
    /// Resolver contract consulted on attest/revoke. Zero means none.
    #[serde(default)]
    pub resolver: Address,
    /// Whether attestations under this schema can be revoked.
    pub revocable: bool,
}

impl SchemaDescription {
    /// A revocable schema without a resolver.
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            resolver: Address::ZERO,
            revocable: true,
        }
    }

    /// Set the resolver address.
    pub fn with_resolver(mut self, resolver: Address) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set revocability.
    pub fn revocable(mut self, revocable: bool) -> Self {
        self.revocable = revocable;
        self
    }

    /// The normalized declaration, as submitted to the registry.
    pub fn normalized_schema(&self) -> Result<String, EasError> {
        Ok(normalize(&self.schema)?)
    }

    /// Derive this description's UID.
    pub fn uid(&self) -> Result<SchemaUid, EasError> {
        derive_schema_uid(&self.schema, self.resolver, self.revocable)
    }
}

/// Derive the UID of `(schema, resolver, revocable)`.
///
/// The schema is normalized first, so whitespace and a redundant outer pair
/// of parentheses do not change the result.
///
/// # Errors
///
/// [`EasError::Schema`] when the declaration normalizes to nothing.
pub fn derive_schema_uid(
    schema: &str,
    resolver: Address,
    revocable: bool,
) -> Result<SchemaUid, EasError> {
    let canonical = normalize(schema)?;
    let preimage = encode_packed(
        &[AbiType::String, AbiType::Address, AbiType::Bool],
        &[
            AbiValue::String(canonical),
            AbiValue::Address(resolver),
            AbiValue::Bool(revocable),
        ],
    )?;
    Ok(SchemaUid(keccak256(preimage)))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use sha3::{Digest, Keccak256};

    /// Independent oracle: raw concatenation hashed with a second Keccak
    /// implementation.
    fn concat_uid(schema: &str, resolver: Address, revocable: bool) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(schema.as_bytes());
        hasher.update(resolver.as_slice());
        hasher.update([u8::from(revocable)]);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }

    proptest! {
        #[test]
        fn packed_derivation_matches_concat_oracle(
            schema in "[a-z0-9]{1,12}( [a-zA-Z0-9_]{1,12})?(, [a-z0-9]{1,12}( [a-zA-Z0-9_]{1,12})?){0,4}",
            resolver in any::<[u8; 20]>(),
            revocable in any::<bool>(),
        ) {
            let resolver = Address::from(resolver);
            let uid = derive_schema_uid(&schema, resolver, revocable).unwrap();
            let canonical = normalize(&schema).unwrap();
            prop_assert_eq!(uid.as_bytes(), &concat_uid(&canonical, resolver, revocable));
        }

        #[test]
        fn uid_ignores_surrounding_whitespace(
            schema in "[a-z]{1,8} [a-z]{1,8}",
            pad in "[ \t\n]{0,4}",
        ) {
            let padded = format!("{pad}{schema}{pad}");
            prop_assert_eq!(
                derive_schema_uid(&padded, Address::ZERO, true).unwrap(),
                derive_schema_uid(&schema, Address::ZERO, true).unwrap()
            );
        }
    }
}
