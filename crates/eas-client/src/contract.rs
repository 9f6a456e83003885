//! # EAS Contract Interface
//!
//! Function and event signatures of the `SchemaRegistry` and `EAS`
//! contracts, and the calldata/return-data codec built on `eas-core`.
//!
//! Calldata is `selector || abi.encode(args)` where the selector is the
//! first four bytes of `keccak256(signature)`. Event topic 0 is the full
//! `keccak256(signature)`.

use alloy_primitives::{hex, keccak256, B256};
use eas_core::{decode, encode, AbiType, AbiValue, DecodeError, EncodeError, SchemaError};

/// A contract function: its canonical signature and return tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Function {
    /// Canonical signature, e.g. `getSchema(bytes32)`.
    pub signature: &'static str,
    /// Return types as a tuple, e.g. `(bytes32)`.
    pub returns: &'static str,
}

impl Function {
    /// The 4-byte selector.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// The function name, the part of the signature before `(`.
    pub fn name(&self) -> &'static str {
        self.signature
            .split_once('(')
            .map_or(self.signature, |(name, _)| name)
    }

    /// Parameter types parsed from the signature.
    pub fn inputs(&self) -> Result<Vec<AbiType>, SchemaError> {
        let params = self
            .signature
            .find('(')
            .map_or("", |open| &self.signature[open..]);
        tuple_components(params)
    }

    /// Return types.
    pub fn outputs(&self) -> Result<Vec<AbiType>, SchemaError> {
        tuple_components(self.returns)
    }

    /// Build calldata for a call with `args`.
    pub fn encode_call(&self, args: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
        let mut calldata = self.selector().to_vec();
        calldata.extend(encode(&self.inputs()?, args)?);
        Ok(calldata)
    }

    /// True when `calldata` starts with this function's selector.
    pub fn matches(&self, calldata: &[u8]) -> bool {
        calldata.get(..4) == Some(&self.selector()[..])
    }

    /// Decode the arguments of `calldata` (selector included).
    pub fn decode_call(&self, calldata: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
        let args = calldata.get(4..).ok_or(DecodeError::Truncated {
            offset: 0,
            needed: 4,
            available: calldata.len(),
        })?;
        decode(&self.inputs()?, args)
    }

    /// Encode return values.
    pub fn encode_output(&self, values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
        encode(&self.outputs()?, values)
    }

    /// Decode return data.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
        decode(&self.outputs()?, data)
    }
}

/// A contract event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Canonical signature, e.g. `Timestamped(bytes32,uint64)`.
    pub signature: &'static str,
}

impl Event {
    /// Topic 0: `keccak256(signature)`.
    pub fn topic0(&self) -> B256 {
        keccak256(self.signature.as_bytes())
    }
}

fn tuple_components(tuple: &str) -> Result<Vec<AbiType>, SchemaError> {
    if tuple == "()" {
        return Ok(Vec::new());
    }
    match AbiType::parse(tuple)? {
        AbiType::Tuple(components) => Ok(components),
        other => Ok(vec![other]),
    }
}

/// Render a selector as `0x`-prefixed hex.
pub fn selector_hex(selector: [u8; 4]) -> String {
    hex::encode_prefixed(selector)
}

/// `SchemaRecord` as returned by `getSchema`.
pub const SCHEMA_RECORD: &str = "(bytes32,address,bool,string)";

/// `Attestation` as returned by `getAttestation`.
pub const ATTESTATION: &str =
    "(bytes32,bytes32,uint64,uint64,uint64,bytes32,address,address,bool,bytes)";

// ─── SchemaRegistry ─────────────────────────────────────────────────────

/// `register(string schema, address resolver, bool revocable) returns (bytes32)`.
pub const REGISTER: Function = Function {
    signature: "register(string,address,bool)",
    returns: "(bytes32)",
};

/// `getSchema(bytes32 uid) returns (SchemaRecord)`.
pub const GET_SCHEMA: Function = Function {
    signature: "getSchema(bytes32)",
    returns: "((bytes32,address,bool,string))",
};

/// `Registered(bytes32 indexed uid, address indexed registerer, SchemaRecord schema)`.
pub const REGISTERED: Event = Event {
    signature: "Registered(bytes32,address,(bytes32,address,bool,string))",
};

// ─── EAS ────────────────────────────────────────────────────────────────

/// `attest(AttestationRequest request) payable returns (bytes32)`.
pub const ATTEST: Function = Function {
    signature: "attest((bytes32,(address,uint64,bool,bytes32,bytes,uint256)))",
    returns: "(bytes32)",
};

/// `revoke(RevocationRequest request) payable`.
pub const REVOKE: Function = Function {
    signature: "revoke((bytes32,(bytes32,uint256)))",
    returns: "()",
};

/// `timestamp(bytes32 data) returns (uint64)`.
pub const TIMESTAMP: Function = Function {
    signature: "timestamp(bytes32)",
    returns: "(uint64)",
};

/// `getAttestation(bytes32 uid) returns (Attestation)`.
pub const GET_ATTESTATION: Function = Function {
    signature: "getAttestation(bytes32)",
    returns: "((bytes32,bytes32,uint64,uint64,uint64,bytes32,address,address,bool,bytes))",
};

/// `isAttestationValid(bytes32 uid) returns (bool)`.
pub const IS_ATTESTATION_VALID: Function = Function {
    signature: "isAttestationValid(bytes32)",
    returns: "(bool)",
};

/// `getTimestamp(bytes32 data) returns (uint64)`.
pub const GET_TIMESTAMP: Function = Function {
    signature: "getTimestamp(bytes32)",
    returns: "(uint64)",
};

/// `Attested(address indexed recipient, address indexed attester, bytes32 uid, bytes32 indexed schemaUID)`.
pub const ATTESTED: Event = Event {
    signature: "Attested(address,address,bytes32,bytes32)",
};

/// `Revoked(address indexed recipient, address indexed attester, bytes32 uid, bytes32 indexed schemaUID)`.
pub const REVOKED: Event = Event {
    signature: "Revoked(address,address,bytes32,bytes32)",
};

/// `Timestamped(bytes32 indexed data, uint64 indexed timestamp)`.
pub const TIMESTAMPED: Event = Event {
    signature: "Timestamped(bytes32,uint64)",
};
