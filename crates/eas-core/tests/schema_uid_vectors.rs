//! # Schema UID and ABI Wire Vectors
//!
//! Pins the public API against digests and encodings produced by the
//! deployed contracts and by Solidity's `abi.encode`. If any of these fail,
//! UIDs computed locally no longer match the ones the registry assigns.
//!
//! Each UID vector is also re-derived by hashing the raw concatenation
//! `schema ++ resolver ++ revocable` with `sha3::Keccak256`, independently
//! of the packed-ABI path and of alloy's Keccak.

use eas_core::{
    decode_values, derive_schema_uid, encode_values, normalize, Address, AbiValue,
    SchemaDescription,
};
use sha3::{Digest, Keccak256};

/// (schema, resolver last byte, revocable, expected uid)
const UID_VECTORS: &[(&str, u8, bool, &str)] = &[
    (
        "uint256 value, string name638786021703006440",
        0,
        true,
        "0xeaed8689d3f36f335df81863a21b1c8841cc5c49f97009b347e2a2afbd9f52a1",
    ),
    (
        "bool isValid",
        0,
        true,
        "0x3bd9214a99672167611d24e9c92db9a47392625176b673462f48c47af7086fc2",
    ),
    (
        "bool isValid",
        0,
        false,
        "0x2ef54e905573ba0eb27dc2052a06d15f925894584ae46ca22161c8daa8c1e56f",
    ),
    (
        "uint256 eventId, uint8 voteIndex",
        0,
        true,
        "0xb16fa048b0d597f5a821747eba64efa4762ee5143e9a80600d0005386edfc995",
    ),
    (
        "bytes32 hash",
        1,
        true,
        "0x8b20eb73696f2ab887e995a65fbc91a24c37380652d49f608a3e42e36f9c6d7a",
    ),
];

fn resolver(last_byte: u8) -> Address {
    Address::with_last_byte(last_byte)
}

#[test]
fn uid_vectors() {
    for (schema, res, revocable, expected) in UID_VECTORS {
        let uid = derive_schema_uid(schema, resolver(*res), *revocable)
            .unwrap_or_else(|e| panic!("derive failed for {schema:?}: {e}"));
        assert_eq!(uid.to_string(), *expected, "schema {schema:?}");
    }
}

fn concat_uid(schema: &str, resolver: Address, revocable: bool) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(schema.as_bytes());
    hasher.update(resolver.as_slice());
    hasher.update([u8::from(revocable)]);
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("0x{hex}")
}

#[test]
fn concat_oracle_agrees_on_vectors() {
    for (schema, res, revocable, expected) in UID_VECTORS {
        let canonical = normalize(schema).unwrap();
        let oracle = concat_uid(&canonical, resolver(*res), *revocable);
        assert_eq!(oracle, *expected, "oracle digest for {schema:?}");
        let uid = derive_schema_uid(schema, resolver(*res), *revocable).unwrap();
        assert_eq!(uid.to_string(), oracle, "packed vs concat for {schema:?}");
    }
}

#[test]
fn uid_vectors_survive_decoration() {
    for (schema, res, revocable, expected) in UID_VECTORS {
        let decorated = format!("\t( {schema} )\n");
        let uid = derive_schema_uid(&decorated, resolver(*res), *revocable).unwrap();
        assert_eq!(uid.to_string(), *expected);
    }
}

#[test]
fn description_matches_vectors() {
    for (schema, res, revocable, expected) in UID_VECTORS {
        let description = SchemaDescription::new(*schema)
            .with_resolver(resolver(*res))
            .revocable(*revocable);
        assert_eq!(description.uid().unwrap().to_string(), *expected);
    }
}

#[test]
fn normalization_is_idempotent_on_vectors() {
    for (schema, ..) in UID_VECTORS {
        let once = normalize(schema).unwrap();
        assert_eq!(normalize(&once).unwrap(), once);
    }
}

#[test]
fn attestation_payload_round_trip() {
    let schema = "uint256 eventId, uint8 voteIndex, tuple(uint8 voteIndex, bool isValid) details, string note";
    let values = vec![
        AbiValue::uint(123_456_789),
        AbiValue::uint(1),
        AbiValue::Tuple(vec![AbiValue::uint(1), AbiValue::Bool(true)]),
        AbiValue::string("first ballot"),
    ];
    let data = encode_values(schema, &values).unwrap();
    // 5 head words (tuple inline), then length and one padded word of text.
    assert_eq!(data.len(), 7 * 32);
    assert_eq!(decode_values(schema, &data).unwrap(), values);
}
