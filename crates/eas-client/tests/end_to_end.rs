//! # Registry and Attestation Flow
//!
//! Drives both facades against the in-memory contracts: registration,
//! attestation of a typed record, reads, revocation and timestamping, plus
//! the facade's handling of receipts that lack or contradict events.

use std::sync::Arc;

use eas_client::contract::{ATTESTED, REGISTERED};
use eas_client::{
    AttestationOptions, AttestationRequest, AttestationUid, ClientError, Clock,
    ContractTransport, Eas, InMemoryEas, LogEntry, SchemaRegistry, TransportError, TxReceipt,
};
use eas_core::{
    decode_values, derive_schema_uid, AbiRecord, AbiValue, Address, SchemaDescription,
    SchemaDescriptor, SchemaError, B256, U256,
};

const ATTESTER: Address = Address::with_last_byte(0xa1);
const RECIPIENT: Address = Address::with_last_byte(0xb2);
const NOW: u64 = 1_700_000_000;
const VOTE_SCHEMA: &str = "uint256 eventId, uint8 voteIndex";

struct Vote {
    event_id: u64,
    vote_index: u8,
}

impl AbiRecord for Vote {
    fn descriptor() -> Result<SchemaDescriptor<Self>, SchemaError> {
        SchemaDescriptor::builder()
            .field(1, "uint8", "voteIndex", |v: &Self| {
                AbiValue::uint(u128::from(v.vote_index))
            })
            .field(0, "uint256", "eventId", |v: &Self| {
                AbiValue::uint(u128::from(v.event_id))
            })
            .build()
    }
}

struct Harness {
    chain: Arc<InMemoryEas>,
    registry: SchemaRegistry<Arc<InMemoryEas>>,
    eas: Eas<Arc<InMemoryEas>>,
}

fn harness() -> Harness {
    let chain = Arc::new(InMemoryEas::new(ATTESTER).with_clock(Clock::Fixed(NOW)));
    Harness {
        registry: SchemaRegistry::new(chain.clone(), chain.registry_address()),
        eas: Eas::new(chain.clone(), chain.eas_address()),
        chain,
    }
}

fn vote_schema(h: &Harness) -> eas_core::SchemaUid {
    h.registry
        .register(&SchemaDescription::new(VOTE_SCHEMA))
        .unwrap()
}

fn revert_reason(err: ClientError) -> String {
    match err {
        ClientError::Transport(TransportError::Reverted(reason)) => reason,
        other => panic!("expected a revert, got {other:?}"),
    }
}

#[test]
fn register_returns_the_locally_derived_uid() {
    let h = harness();
    let uid = h
        .registry
        .register(&SchemaDescription::new(format!("({VOTE_SCHEMA})")))
        .unwrap();
    assert_eq!(uid, derive_schema_uid(VOTE_SCHEMA, Address::ZERO, true).unwrap());
    assert_eq!(
        uid.to_string(),
        "0xb16fa048b0d597f5a821747eba64efa4762ee5143e9a80600d0005386edfc995"
    );

    let record = h.registry.get_schema(uid).unwrap().unwrap();
    assert_eq!(record.uid, uid);
    assert_eq!(record.schema, VOTE_SCHEMA);
    assert!(record.revocable);
    assert_eq!(record.resolver, Address::ZERO);
}

#[test]
fn registering_twice_reverts() {
    let h = harness();
    let description = SchemaDescription::new("bool isValid").revocable(false);
    h.registry.register(&description).unwrap();
    let err = h.registry.register(&description).unwrap_err();
    assert_eq!(revert_reason(err), "AlreadyExists");
    assert_eq!(h.chain.schema_count(), 1);
}

#[test]
fn unknown_schema_reads_as_none() {
    let h = harness();
    let uid = derive_schema_uid("bool isValid", Address::ZERO, true).unwrap();
    assert!(h.registry.get_schema(uid).unwrap().is_none());
}

#[test]
fn attest_record_and_read_it_back() {
    let h = harness();
    let schema = vote_schema(&h);
    let vote = Vote {
        event_id: 42,
        vote_index: 3,
    };

    let uid = h
        .eas
        .attest_record(schema, VOTE_SCHEMA, RECIPIENT, &vote, AttestationOptions::default())
        .unwrap();
    assert!(!uid.is_zero());
    assert!(h.eas.is_attestation_valid(uid).unwrap());

    let attestation = h.eas.get_attestation(uid).unwrap().unwrap();
    assert_eq!(attestation.uid, uid);
    assert_eq!(attestation.schema, schema);
    assert_eq!(attestation.recipient, RECIPIENT);
    assert_eq!(attestation.attester, ATTESTER);
    assert_eq!(attestation.time, NOW);
    assert!(!attestation.is_revoked());

    let values = decode_values(VOTE_SCHEMA, &attestation.data).unwrap();
    assert_eq!(values, vec![AbiValue::uint(42), AbiValue::uint(3)]);
}

#[test]
fn attest_record_rejects_a_mismatched_schema() {
    let h = harness();
    let schema = vote_schema(&h);
    let vote = Vote {
        event_id: 1,
        vote_index: 0,
    };
    let err = h
        .eas
        .attest_record(
            schema,
            "uint8 voteIndex, uint256 eventId",
            RECIPIENT,
            &vote,
            AttestationOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, ClientError::Encode(_)), "{err:?}");
    assert_eq!(h.chain.attestation_count(), 0);
}

#[test]
fn identical_requests_get_distinct_uids() {
    let h = harness();
    let schema = vote_schema(&h);
    let request = AttestationRequest::new(schema, RECIPIENT, vec![0u8; 64]);
    let first = h.eas.attest(&request).unwrap();
    let second = h.eas.attest(&request).unwrap();
    assert_ne!(first, second);
    assert_eq!(h.chain.attestation_count(), 2);
}

#[test]
fn attest_enforces_contract_rules() {
    let h = harness();
    let schema = vote_schema(&h);
    let irrevocable = h
        .registry
        .register(&SchemaDescription::new("bool isValid").revocable(false))
        .unwrap();

    let unknown = AttestationRequest::new(
        derive_schema_uid("bytes32 hash", Address::ZERO, true).unwrap(),
        RECIPIENT,
        vec![],
    );
    assert_eq!(revert_reason(h.eas.attest(&unknown).unwrap_err()), "InvalidSchema");

    let expired = AttestationRequest::new(schema, RECIPIENT, vec![]).with_options(
        AttestationOptions {
            expiration_time: NOW,
            ..AttestationOptions::default()
        },
    );
    assert_eq!(
        revert_reason(h.eas.attest(&expired).unwrap_err()),
        "InvalidExpirationTime"
    );

    let revocable_on_irrevocable = AttestationRequest::new(irrevocable, RECIPIENT, vec![]);
    assert_eq!(
        revert_reason(h.eas.attest(&revocable_on_irrevocable).unwrap_err()),
        "Irrevocable"
    );

    let dangling_ref = AttestationRequest::new(schema, RECIPIENT, vec![]).with_options(
        AttestationOptions {
            ref_uid: AttestationUid::new(B256::repeat_byte(9)),
            ..AttestationOptions::default()
        },
    );
    assert_eq!(revert_reason(h.eas.attest(&dangling_ref).unwrap_err()), "NotFound");

    let paid = AttestationRequest::new(schema, RECIPIENT, vec![]).with_options(
        AttestationOptions {
            value: U256::from(1u64),
            ..AttestationOptions::default()
        },
    );
    assert_eq!(revert_reason(h.eas.attest(&paid).unwrap_err()), "NotPayable");
}

#[test]
fn referenced_attestation_is_recorded() {
    let h = harness();
    let schema = vote_schema(&h);
    let parent = h
        .eas
        .attest(&AttestationRequest::new(schema, RECIPIENT, vec![1]))
        .unwrap();
    let child = h
        .eas
        .attest(
            &AttestationRequest::new(schema, RECIPIENT, vec![2]).with_options(AttestationOptions {
                ref_uid: parent,
                expiration_time: NOW + 60,
                ..AttestationOptions::default()
            }),
        )
        .unwrap();
    let attestation = h.eas.get_attestation(child).unwrap().unwrap();
    assert_eq!(attestation.ref_uid, parent);
    assert_eq!(attestation.expiration_time, NOW + 60);
    assert!(!attestation.is_expired(NOW));
    assert!(attestation.is_expired(NOW + 60));
}

#[test]
fn revoke_once() {
    let h = harness();
    let schema = vote_schema(&h);
    let uid = h
        .eas
        .attest(&AttestationRequest::new(schema, RECIPIENT, vec![]))
        .unwrap();

    let receipt = h.eas.revoke(schema, uid).unwrap();
    assert!(receipt.success);
    let attestation = h.eas.get_attestation(uid).unwrap().unwrap();
    assert_eq!(attestation.revocation_time, NOW);
    assert!(attestation.is_revoked());
    // Revoked attestations still exist.
    assert!(h.eas.is_attestation_valid(uid).unwrap());

    let err = h.eas.revoke(schema, uid).unwrap_err();
    assert_eq!(revert_reason(err), "AlreadyRevoked");
}

#[test]
fn revoke_checks_existence_and_revocability() {
    let h = harness();
    let schema = vote_schema(&h);
    let missing = AttestationUid::new(B256::repeat_byte(7));
    assert_eq!(revert_reason(h.eas.revoke(schema, missing).unwrap_err()), "NotFound");

    let uid = h
        .eas
        .attest(
            &AttestationRequest::new(schema, RECIPIENT, vec![]).with_options(AttestationOptions {
                revocable: false,
                ..AttestationOptions::default()
            }),
        )
        .unwrap();
    assert_eq!(revert_reason(h.eas.revoke(schema, uid).unwrap_err()), "Irrevocable");

    let other = derive_schema_uid("bool isValid", Address::ZERO, true).unwrap();
    assert_eq!(revert_reason(h.eas.revoke(other, uid).unwrap_err()), "InvalidSchema");
}

#[test]
fn only_the_attester_may_revoke() {
    let h = harness();
    let schema = vote_schema(&h);
    let uid = h
        .eas
        .attest(&AttestationRequest::new(schema, RECIPIENT, vec![]))
        .unwrap();

    let stranger = Eas::new(h.chain.acting_as(Address::with_last_byte(0x99)), h.chain.eas_address());
    let err = stranger.revoke(schema, uid).unwrap_err();
    assert_eq!(revert_reason(err), "AccessDenied");
    assert!(!h.eas.get_attestation(uid).unwrap().unwrap().is_revoked());
}

#[test]
fn timestamp_once() {
    let h = harness();
    let data = B256::repeat_byte(0x5a);
    assert_eq!(h.eas.get_timestamp(data).unwrap(), 0);

    let time = h.eas.timestamp(data).unwrap();
    assert_eq!(time, NOW);
    assert_eq!(h.eas.get_timestamp(data).unwrap(), NOW);

    let err = h.eas.timestamp(data).unwrap_err();
    assert_eq!(revert_reason(err), "AlreadyTimestamped");
}

#[test]
fn missing_attestation_reads_as_none() {
    let h = harness();
    let uid = AttestationUid::new(B256::repeat_byte(1));
    assert!(h.eas.get_attestation(uid).unwrap().is_none());
    assert!(!h.eas.is_attestation_valid(uid).unwrap());
}

/// Returns a canned receipt for every transaction.
struct CannedReceipt(TxReceipt);

impl ContractTransport for CannedReceipt {
    fn call(&self, _to: Address, _calldata: &[u8]) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::Unavailable("no reads".into()))
    }

    fn send(&self, _to: Address, _calldata: &[u8], _value: U256) -> Result<TxReceipt, TransportError> {
        Ok(self.0.clone())
    }
}

fn receipt(success: bool, logs: Vec<LogEntry>) -> TxReceipt {
    TxReceipt {
        tx_hash: B256::repeat_byte(0xee),
        block_number: 1,
        success,
        logs,
    }
}

const REGISTRY: Address = Address::with_last_byte(0x10);

#[test]
fn register_without_event_is_missing_event() {
    let registry = SchemaRegistry::new(CannedReceipt(receipt(true, vec![])), REGISTRY);
    let err = registry
        .register(&SchemaDescription::new("bool isValid"))
        .unwrap_err();
    assert!(
        matches!(err, ClientError::MissingEvent { event, .. } if event == REGISTERED.signature),
        "{err:?}"
    );
}

#[test]
fn register_with_foreign_uid_is_mismatch() {
    let log = LogEntry {
        address: REGISTRY,
        topics: vec![REGISTERED.topic0(), B256::repeat_byte(0x01), B256::ZERO],
        data: vec![],
    };
    let registry = SchemaRegistry::new(CannedReceipt(receipt(true, vec![log])), REGISTRY);
    let err = registry
        .register(&SchemaDescription::new("bool isValid"))
        .unwrap_err();
    match err {
        ClientError::UidMismatch { expected, actual } => {
            assert_eq!(
                expected,
                derive_schema_uid("bool isValid", Address::ZERO, true).unwrap()
            );
            assert_eq!(actual.as_b256(), B256::repeat_byte(0x01));
        }
        other => panic!("expected UidMismatch, got {other:?}"),
    }
}

#[test]
fn event_from_another_contract_is_ignored() {
    let log = LogEntry {
        address: Address::with_last_byte(0x77),
        topics: vec![ATTESTED.topic0()],
        data: B256::repeat_byte(3).to_vec(),
    };
    let eas = Eas::new(CannedReceipt(receipt(true, vec![log])), Address::with_last_byte(0x20));
    let request = AttestationRequest::new(eas_core::SchemaUid::ZERO, RECIPIENT, vec![]);
    assert!(matches!(
        eas.attest(&request),
        Err(ClientError::MissingEvent { .. })
    ));
}

#[test]
fn failed_receipt_is_reported_as_revert() {
    let registry = SchemaRegistry::new(CannedReceipt(receipt(false, vec![])), REGISTRY);
    let err = registry
        .register(&SchemaDescription::new("bool isValid"))
        .unwrap_err();
    assert!(revert_reason(err).contains("failed"));
}
