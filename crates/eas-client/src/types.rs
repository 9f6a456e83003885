//! # EAS Records and Requests
//!
//! DTOs exchanged with the contracts, with conversions to and from the
//! ABI tuples in [`crate::contract`]. Decoding is strict about shape:
//! a tuple with the wrong arity or component kinds is rejected, not
//! defaulted.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{hex, Address, B256, U256};
use eas_core::{AbiValue, SchemaUid};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// The 32-byte identifier of an attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttestationUid(B256);

impl AttestationUid {
    /// The all-zero UID, returned by the contract for "no such attestation".
    pub const ZERO: Self = Self(B256::ZERO);

    /// Wrap a raw 32-byte value.
    pub const fn new(bytes: B256) -> Self {
        Self(bytes)
    }

    /// The UID as a `B256` word.
    pub fn as_b256(&self) -> B256 {
        self.0
    }

    /// True for [`AttestationUid::ZERO`].
    pub fn is_zero(&self) -> bool {
        self.0 == B256::ZERO
    }
}

impl From<B256> for AttestationUid {
    fn from(bytes: B256) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for AttestationUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_prefixed(self.0))
    }
}

impl FromStr for AttestationUid {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<B256>().map(Self)
    }
}

/// A schema as stored by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRecord {
    /// The schema UID.
    pub uid: SchemaUid,
    /// Resolver contract, zero for none.
    pub resolver: Address,
    /// Whether attestations can be revoked.
    pub revocable: bool,
    /// The schema declaration as registered.
    pub schema: String,
}

impl SchemaRecord {
    /// ABI tuple `(bytes32,address,bool,string)`.
    pub fn to_abi(&self) -> AbiValue {
        AbiValue::Tuple(vec![
            word(self.uid.as_b256()),
            AbiValue::Address(self.resolver),
            AbiValue::Bool(self.revocable),
            AbiValue::String(self.schema.clone()),
        ])
    }

    /// Parse the tuple returned by `getSchema`.
    pub fn from_abi(value: &AbiValue) -> Result<Self, ClientError> {
        let fields = tuple_fields(value, 4, "SchemaRecord")?;
        Ok(Self {
            uid: SchemaUid::new(as_b256(&fields[0])?),
            resolver: as_address(&fields[1])?,
            revocable: as_bool(&fields[2])?,
            schema: as_string(&fields[3])?,
        })
    }
}

/// An attestation as stored by the EAS contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    /// Attestation UID.
    pub uid: AttestationUid,
    /// UID of the schema the data conforms to.
    pub schema: SchemaUid,
    /// Creation time, unix seconds.
    pub time: u64,
    /// Expiration time, zero for none.
    pub expiration_time: u64,
    /// Revocation time, zero while not revoked.
    pub revocation_time: u64,
    /// Referenced attestation, zero for none.
    pub ref_uid: AttestationUid,
    /// Subject of the attestation.
    pub recipient: Address,
    /// Account that created it.
    pub attester: Address,
    /// Whether it can be revoked.
    pub revocable: bool,
    /// ABI-encoded payload conforming to the schema.
    #[serde(with = "hex_data")]
    pub data: Vec<u8>,
}

impl Attestation {
    /// True once revoked.
    pub fn is_revoked(&self) -> bool {
        self.revocation_time != 0
    }

    /// True when an expiration time is set and `now` has reached it.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expiration_time != 0 && self.expiration_time <= now
    }

    /// ABI tuple matching [`crate::contract::ATTESTATION`].
    pub fn to_abi(&self) -> AbiValue {
        AbiValue::Tuple(vec![
            word(self.uid.as_b256()),
            word(self.schema.as_b256()),
            uint(self.time),
            uint(self.expiration_time),
            uint(self.revocation_time),
            word(self.ref_uid.as_b256()),
            AbiValue::Address(self.recipient),
            AbiValue::Address(self.attester),
            AbiValue::Bool(self.revocable),
            AbiValue::Bytes(self.data.clone()),
        ])
    }

    /// Parse the tuple returned by `getAttestation`.
    pub fn from_abi(value: &AbiValue) -> Result<Self, ClientError> {
        let fields = tuple_fields(value, 10, "Attestation")?;
        Ok(Self {
            uid: AttestationUid::new(as_b256(&fields[0])?),
            schema: SchemaUid::new(as_b256(&fields[1])?),
            time: as_u64(&fields[2])?,
            expiration_time: as_u64(&fields[3])?,
            revocation_time: as_u64(&fields[4])?,
            ref_uid: AttestationUid::new(as_b256(&fields[5])?),
            recipient: as_address(&fields[6])?,
            attester: as_address(&fields[7])?,
            revocable: as_bool(&fields[8])?,
            data: as_bytes(&fields[9])?,
        })
    }
}

/// Per-attestation options of an [`AttestationRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationOptions {
    /// Expiration time, zero for none.
    #[serde(default)]
    pub expiration_time: u64,
    /// Whether the attestation can be revoked.
    #[serde(default = "default_revocable")]
    pub revocable: bool,
    /// Referenced attestation, zero for none.
    #[serde(default)]
    pub ref_uid: AttestationUid,
    /// Wei forwarded to the resolver.
    #[serde(default)]
    pub value: U256,
}

fn default_revocable() -> bool {
    true
}

impl Default for AttestationOptions {
    fn default() -> Self {
        Self {
            expiration_time: 0,
            revocable: true,
            ref_uid: AttestationUid::ZERO,
            value: U256::ZERO,
        }
    }
}

impl Default for AttestationUid {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Arguments of `attest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationRequest {
    /// Target schema.
    pub schema: SchemaUid,
    /// Subject of the attestation.
    pub recipient: Address,
    /// ABI-encoded payload.
    #[serde(with = "hex_data")]
    pub data: Vec<u8>,
    /// Expiration, revocability, reference and value.
    #[serde(flatten)]
    pub options: AttestationOptions,
}

impl AttestationRequest {
    /// A request with default options.
    pub fn new(schema: SchemaUid, recipient: Address, data: Vec<u8>) -> Self {
        Self {
            schema,
            recipient,
            data,
            options: AttestationOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: AttestationOptions) -> Self {
        self.options = options;
        self
    }

    /// ABI tuple `(bytes32,(address,uint64,bool,bytes32,bytes,uint256))`.
    pub fn to_abi(&self) -> AbiValue {
        AbiValue::Tuple(vec![
            word(self.schema.as_b256()),
            AbiValue::Tuple(vec![
                AbiValue::Address(self.recipient),
                uint(self.options.expiration_time),
                AbiValue::Bool(self.options.revocable),
                word(self.options.ref_uid.as_b256()),
                AbiValue::Bytes(self.data.clone()),
                AbiValue::Uint(self.options.value),
            ]),
        ])
    }

    /// Parse the `attest` argument tuple.
    pub fn from_abi(value: &AbiValue) -> Result<Self, ClientError> {
        let outer = tuple_fields(value, 2, "AttestationRequest")?;
        let inner = tuple_fields(&outer[1], 6, "AttestationRequestData")?;
        Ok(Self {
            schema: SchemaUid::new(as_b256(&outer[0])?),
            recipient: as_address(&inner[0])?,
            data: as_bytes(&inner[4])?,
            options: AttestationOptions {
                expiration_time: as_u64(&inner[1])?,
                revocable: as_bool(&inner[2])?,
                ref_uid: AttestationUid::new(as_b256(&inner[3])?),
                value: as_u256(&inner[5])?,
            },
        })
    }
}

/// Arguments of `revoke`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRequest {
    /// Schema of the attestation.
    pub schema: SchemaUid,
    /// Attestation to revoke.
    pub uid: AttestationUid,
    /// Wei forwarded to the resolver.
    #[serde(default)]
    pub value: U256,
}

impl RevocationRequest {
    /// ABI tuple `(bytes32,(bytes32,uint256))`.
    pub fn to_abi(&self) -> AbiValue {
        AbiValue::Tuple(vec![
            word(self.schema.as_b256()),
            AbiValue::Tuple(vec![word(self.uid.as_b256()), AbiValue::Uint(self.value)]),
        ])
    }

    /// Parse the `revoke` argument tuple.
    pub fn from_abi(value: &AbiValue) -> Result<Self, ClientError> {
        let outer = tuple_fields(value, 2, "RevocationRequest")?;
        let inner = tuple_fields(&outer[1], 2, "RevocationRequestData")?;
        Ok(Self {
            schema: SchemaUid::new(as_b256(&outer[0])?),
            uid: AttestationUid::new(as_b256(&inner[0])?),
            value: as_u256(&inner[1])?,
        })
    }
}

// ─── ABI value helpers ──────────────────────────────────────────────────

pub(crate) fn word(value: B256) -> AbiValue {
    AbiValue::FixedBytes(value.to_vec())
}

pub(crate) fn uint(value: u64) -> AbiValue {
    AbiValue::Uint(U256::from(value))
}

fn unexpected(expected: &str, found: &AbiValue) -> ClientError {
    ClientError::Malformed(format!("expected {expected}, found {}", found.kind()))
}

pub(crate) fn tuple_fields<'a>(
    value: &'a AbiValue,
    arity: usize,
    what: &str,
) -> Result<&'a [AbiValue], ClientError> {
    match value {
        AbiValue::Tuple(fields) if fields.len() == arity => Ok(fields),
        AbiValue::Tuple(fields) => Err(ClientError::Malformed(format!(
            "{what} has {} fields, expected {arity}",
            fields.len()
        ))),
        other => Err(unexpected(what, other)),
    }
}

pub(crate) fn as_b256(value: &AbiValue) -> Result<B256, ClientError> {
    match value {
        AbiValue::FixedBytes(bytes) if bytes.len() == 32 => Ok(B256::from_slice(bytes)),
        other => Err(unexpected("bytes32", other)),
    }
}

pub(crate) fn as_address(value: &AbiValue) -> Result<Address, ClientError> {
    match value {
        AbiValue::Address(address) => Ok(*address),
        other => Err(unexpected("address", other)),
    }
}

pub(crate) fn as_bool(value: &AbiValue) -> Result<bool, ClientError> {
    match value {
        AbiValue::Bool(b) => Ok(*b),
        other => Err(unexpected("bool", other)),
    }
}

pub(crate) fn as_string(value: &AbiValue) -> Result<String, ClientError> {
    match value {
        AbiValue::String(s) => Ok(s.clone()),
        other => Err(unexpected("string", other)),
    }
}

pub(crate) fn as_bytes(value: &AbiValue) -> Result<Vec<u8>, ClientError> {
    match value {
        AbiValue::Bytes(bytes) => Ok(bytes.clone()),
        other => Err(unexpected("bytes", other)),
    }
}

pub(crate) fn as_u256(value: &AbiValue) -> Result<U256, ClientError> {
    match value {
        AbiValue::Uint(v) => Ok(*v),
        other => Err(unexpected("uint", other)),
    }
}

pub(crate) fn as_u64(value: &AbiValue) -> Result<u64, ClientError> {
    let v = as_u256(value)?;
    u64::try_from(v).map_err(|_| ClientError::Malformed(format!("{v} does not fit uint64")))
}

/// `0x` hex (de)serialization for byte vectors.
pub(crate) mod hex_data {
    use alloy_primitives::hex;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode_prefixed(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        hex::decode(raw).map_err(serde::de::Error::custom)
    }
}
