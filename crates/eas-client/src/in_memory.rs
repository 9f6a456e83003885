//! # In-Memory EAS
//!
//! A [`ContractTransport`] that emulates the `SchemaRegistry` and `EAS`
//! contracts at the calldata level: it decodes calldata with the core ABI
//! decoder, applies the contracts' checks, returns ABI-encoded results and
//! emits the same event logs. The facades cannot tell it from a chain.
//!
//! ## Emulated Behavior
//!
//! - `register` hashes the schema string exactly as received and reverts
//!   with `AlreadyExists` on a duplicate.
//! - `attest` derives the attestation UID as
//!   `keccak256(abi.encodePacked(schema, recipient, attester, time,
//!   expirationTime, revocable, refUID, data, bump))`, bumping until unused.
//! - `revoke` enforces existence, schema match and attester-only access,
//!   and allows a single revocation of a revocable attestation.
//! - `timestamp` records a time once per data word.
//!
//! Revert reasons are the contracts' custom error names.
//!
//! ## Warning
//!
//! Provides no chain guarantees. Intended for tests and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{hex, keccak256, Address, B256, U256};
use eas_core::{encode, encode_packed, AbiType, AbiValue, SchemaUid};
use parking_lot::RwLock;

use crate::contract::{
    Function, ATTEST, ATTESTED, GET_ATTESTATION, GET_SCHEMA, GET_TIMESTAMP,
    IS_ATTESTATION_VALID, REGISTER, REGISTERED, REVOKE, REVOKED, TIMESTAMP, TIMESTAMPED,
};
use crate::error::TransportError;
use crate::transport::{ContractTransport, LogEntry, TxReceipt};
use crate::types::{
    as_address, as_b256, as_bool, as_string, uint, word, Attestation, AttestationRequest,
    AttestationUid, RevocationRequest, SchemaRecord,
};

/// Default address of the emulated registry.
pub const DEFAULT_REGISTRY_ADDRESS: Address = Address::with_last_byte(0xee);

/// Default address of the emulated EAS contract.
pub const DEFAULT_EAS_ADDRESS: Address = Address::with_last_byte(0xea);

/// Source of block timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Wall-clock UTC seconds.
    System,
    /// A fixed time, for deterministic tests.
    Fixed(u64),
}

impl Clock {
    fn now(self) -> u64 {
        match self {
            Self::System => u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0),
            Self::Fixed(t) => t,
        }
    }
}

#[derive(Debug, Default)]
struct Ledger {
    schemas: HashMap<B256, SchemaRecord>,
    attestations: HashMap<B256, Attestation>,
    timestamps: HashMap<B256, u64>,
}

/// In-memory emulation of the registry and EAS contracts.
#[derive(Debug)]
pub struct InMemoryEas {
    registry: Address,
    eas: Address,
    sender: Address,
    clock: Clock,
    next_block: AtomicU64,
    ledger: RwLock<Ledger>,
}

impl InMemoryEas {
    /// Emulate both contracts at their default addresses, sending as `sender`.
    pub fn new(sender: Address) -> Self {
        Self {
            registry: DEFAULT_REGISTRY_ADDRESS,
            eas: DEFAULT_EAS_ADDRESS,
            sender,
            clock: Clock::System,
            next_block: AtomicU64::new(1),
            ledger: RwLock::new(Ledger::default()),
        }
    }

    /// Place the contracts at custom addresses.
    pub fn with_addresses(mut self, registry: Address, eas: Address) -> Self {
        self.registry = registry;
        self.eas = eas;
        self
    }

    /// Use a fixed block time.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Address of the emulated registry.
    pub fn registry_address(&self) -> Address {
        self.registry
    }

    /// Address of the emulated EAS contract.
    pub fn eas_address(&self) -> Address {
        self.eas
    }

    /// The account transactions are sent from.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Number of registered schemas.
    pub fn schema_count(&self) -> usize {
        self.ledger.read().schemas.len()
    }

    /// Number of stored attestations.
    pub fn attestation_count(&self) -> usize {
        self.ledger.read().attestations.len()
    }

    /// Send transactions as `sender` against the same ledger.
    pub fn acting_as(&self, sender: Address) -> Impersonated<'_> {
        Impersonated {
            chain: self,
            sender,
        }
    }

    fn execute(
        &self,
        sender: Address,
        to: Address,
        calldata: &[u8],
        value: U256,
    ) -> Result<TxReceipt, TransportError> {
        let now = self.clock.now();
        let logs = self.dispatch_send(sender, to, calldata, value, now)?;
        let block_number = self.next_block.fetch_add(1, Ordering::SeqCst);

        let mut preimage = calldata.to_vec();
        preimage.extend_from_slice(&block_number.to_be_bytes());
        let tx_hash = keccak256(preimage);
        tracing::debug!(%tx_hash, %sender, block_number, logs = logs.len(), "in-memory transaction mined");

        Ok(TxReceipt {
            tx_hash,
            block_number,
            success: true,
            logs,
        })
    }

    fn dispatch_call(&self, to: Address, calldata: &[u8]) -> Result<Vec<u8>, TransportError> {
        let ledger = self.ledger.read();
        if to == self.registry {
            if !GET_SCHEMA.matches(calldata) {
                return Err(unknown_selector(calldata));
            }
            let uid = single_word(&GET_SCHEMA, calldata)?;
            let record = ledger.schemas.get(&uid).cloned().unwrap_or(SchemaRecord {
                uid: SchemaUid::ZERO,
                resolver: Address::ZERO,
                revocable: false,
                schema: String::new(),
            });
            return output(&GET_SCHEMA, &[record.to_abi()]);
        }
        if to != self.eas {
            return Err(no_contract(to));
        }
        if GET_ATTESTATION.matches(calldata) {
            let uid = single_word(&GET_ATTESTATION, calldata)?;
            let attestation = ledger
                .attestations
                .get(&uid)
                .cloned()
                .unwrap_or_else(empty_attestation);
            output(&GET_ATTESTATION, &[attestation.to_abi()])
        } else if IS_ATTESTATION_VALID.matches(calldata) {
            let uid = single_word(&IS_ATTESTATION_VALID, calldata)?;
            let valid = ledger.attestations.contains_key(&uid);
            output(&IS_ATTESTATION_VALID, &[AbiValue::Bool(valid)])
        } else if GET_TIMESTAMP.matches(calldata) {
            let data = single_word(&GET_TIMESTAMP, calldata)?;
            let time = ledger.timestamps.get(&data).copied().unwrap_or(0);
            output(&GET_TIMESTAMP, &[uint(time)])
        } else {
            Err(unknown_selector(calldata))
        }
    }

    fn dispatch_send(
        &self,
        sender: Address,
        to: Address,
        calldata: &[u8],
        value: U256,
        now: u64,
    ) -> Result<Vec<LogEntry>, TransportError> {
        if to == self.registry {
            return if REGISTER.matches(calldata) {
                self.register(sender, calldata)
            } else {
                Err(unknown_selector(calldata))
            };
        }
        if to != self.eas {
            return Err(no_contract(to));
        }
        if ATTEST.matches(calldata) {
            self.attest(sender, calldata, value, now)
        } else if REVOKE.matches(calldata) {
            self.revoke(sender, calldata, now)
        } else if TIMESTAMP.matches(calldata) {
            self.timestamp(calldata, now)
        } else {
            Err(unknown_selector(calldata))
        }
    }

    fn register(&self, sender: Address, calldata: &[u8]) -> Result<Vec<LogEntry>, TransportError> {
        let args = REGISTER.decode_call(calldata).map_err(invalid_calldata)?;
        let (schema, resolver, revocable) = match args.as_slice() {
            [schema, resolver, revocable] => (
                as_string(schema).map_err(invalid_calldata)?,
                as_address(resolver).map_err(invalid_calldata)?,
                as_bool(revocable).map_err(invalid_calldata)?,
            ),
            _ => return Err(TransportError::Reverted("invalid calldata".into())),
        };

        let preimage = encode_packed(
            &[AbiType::String, AbiType::Address, AbiType::Bool],
            &[
                AbiValue::String(schema.clone()),
                AbiValue::Address(resolver),
                AbiValue::Bool(revocable),
            ],
        )
        .map_err(invalid_calldata)?;
        let uid = keccak256(preimage);

        let mut ledger = self.ledger.write();
        if ledger.schemas.contains_key(&uid) {
            return Err(TransportError::Reverted("AlreadyExists".into()));
        }
        let record = SchemaRecord {
            uid: SchemaUid::new(uid),
            resolver,
            revocable,
            schema,
        };
        let data = encode(
            &[AbiType::parse(crate::contract::SCHEMA_RECORD).map_err(invalid_calldata)?],
            &[record.to_abi()],
        )
        .map_err(invalid_calldata)?;
        ledger.schemas.insert(uid, record);

        Ok(vec![LogEntry {
            address: self.registry,
            topics: vec![REGISTERED.topic0(), uid, address_topic(sender)],
            data,
        }])
    }

    fn attest(
        &self,
        sender: Address,
        calldata: &[u8],
        value: U256,
        now: u64,
    ) -> Result<Vec<LogEntry>, TransportError> {
        let args = ATTEST.decode_call(calldata).map_err(invalid_calldata)?;
        let request = args
            .first()
            .ok_or_else(|| TransportError::Reverted("invalid calldata".into()))
            .and_then(|arg| AttestationRequest::from_abi(arg).map_err(invalid_calldata))?;
        let options = &request.options;

        let mut ledger = self.ledger.write();
        let schema = ledger
            .schemas
            .get(&request.schema.as_b256())
            .ok_or_else(|| TransportError::Reverted("InvalidSchema".into()))?;
        if options.expiration_time != 0 && options.expiration_time <= now {
            return Err(TransportError::Reverted("InvalidExpirationTime".into()));
        }
        if !schema.revocable && options.revocable {
            return Err(TransportError::Reverted("Irrevocable".into()));
        }
        if !options.ref_uid.is_zero()
            && !ledger.attestations.contains_key(&options.ref_uid.as_b256())
        {
            return Err(TransportError::Reverted("NotFound".into()));
        }
        if value < options.value {
            return Err(TransportError::Reverted("InsufficientValue".into()));
        }
        if !options.value.is_zero() && schema.resolver == Address::ZERO {
            return Err(TransportError::Reverted("NotPayable".into()));
        }

        let mut attestation = Attestation {
            uid: AttestationUid::ZERO,
            schema: request.schema,
            time: now,
            expiration_time: options.expiration_time,
            revocation_time: 0,
            ref_uid: options.ref_uid,
            recipient: request.recipient,
            attester: sender,
            revocable: options.revocable,
            data: request.data.clone(),
        };
        let mut bump = 0u32;
        let uid = loop {
            let candidate = attestation_uid(&attestation, bump).map_err(invalid_calldata)?;
            if !ledger.attestations.contains_key(&candidate) {
                break candidate;
            }
            bump += 1;
        };
        attestation.uid = AttestationUid::new(uid);
        ledger.attestations.insert(uid, attestation);

        Ok(vec![LogEntry {
            address: self.eas,
            topics: vec![
                ATTESTED.topic0(),
                address_topic(request.recipient),
                address_topic(sender),
                request.schema.as_b256(),
            ],
            data: uid.to_vec(),
        }])
    }

    fn revoke(&self, sender: Address, calldata: &[u8], now: u64) -> Result<Vec<LogEntry>, TransportError> {
        let args = REVOKE.decode_call(calldata).map_err(invalid_calldata)?;
        let request = args
            .first()
            .ok_or_else(|| TransportError::Reverted("invalid calldata".into()))
            .and_then(|arg| RevocationRequest::from_abi(arg).map_err(invalid_calldata))?;

        let mut ledger = self.ledger.write();
        let attestation = ledger
            .attestations
            .get_mut(&request.uid.as_b256())
            .ok_or_else(|| TransportError::Reverted("NotFound".into()))?;
        if attestation.schema != request.schema {
            return Err(TransportError::Reverted("InvalidSchema".into()));
        }
        if attestation.attester != sender {
            return Err(TransportError::Reverted("AccessDenied".into()));
        }
        if !attestation.revocable {
            return Err(TransportError::Reverted("Irrevocable".into()));
        }
        if attestation.is_revoked() {
            return Err(TransportError::Reverted("AlreadyRevoked".into()));
        }
        attestation.revocation_time = now;

        Ok(vec![LogEntry {
            address: self.eas,
            topics: vec![
                REVOKED.topic0(),
                address_topic(attestation.recipient),
                address_topic(sender),
                attestation.schema.as_b256(),
            ],
            data: request.uid.as_b256().to_vec(),
        }])
    }

    fn timestamp(&self, calldata: &[u8], now: u64) -> Result<Vec<LogEntry>, TransportError> {
        let data = single_word(&TIMESTAMP, calldata)?;
        let mut ledger = self.ledger.write();
        if ledger.timestamps.contains_key(&data) {
            return Err(TransportError::Reverted("AlreadyTimestamped".into()));
        }
        ledger.timestamps.insert(data, now);
        Ok(vec![LogEntry {
            address: self.eas,
            topics: vec![
                TIMESTAMPED.topic0(),
                data,
                B256::from(U256::from(now).to_be_bytes::<32>()),
            ],
            data: Vec::new(),
        }])
    }
}

impl ContractTransport for InMemoryEas {
    fn call(&self, to: Address, calldata: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.dispatch_call(to, calldata)
    }

    fn send(&self, to: Address, calldata: &[u8], value: U256) -> Result<TxReceipt, TransportError> {
        self.execute(self.sender, to, calldata, value)
    }
}

/// A view of an [`InMemoryEas`] that sends transactions from another account.
#[derive(Debug, Clone, Copy)]
pub struct Impersonated<'a> {
    chain: &'a InMemoryEas,
    sender: Address,
}

impl ContractTransport for Impersonated<'_> {
    fn call(&self, to: Address, calldata: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.chain.dispatch_call(to, calldata)
    }

    fn send(&self, to: Address, calldata: &[u8], value: U256) -> Result<TxReceipt, TransportError> {
        self.chain.execute(self.sender, to, calldata, value)
    }
}

/// `keccak256(abi.encodePacked(schema, recipient, attester, time,
/// expirationTime, revocable, refUID, data, bump))`.
fn attestation_uid(attestation: &Attestation, bump: u32) -> Result<B256, eas_core::EncodeError> {
    let types = [
        AbiType::FixedBytes(32),
        AbiType::Address,
        AbiType::Address,
        AbiType::Uint(64),
        AbiType::Uint(64),
        AbiType::Bool,
        AbiType::FixedBytes(32),
        AbiType::Bytes,
        AbiType::Uint(32),
    ];
    let values = [
        word(attestation.schema.as_b256()),
        AbiValue::Address(attestation.recipient),
        AbiValue::Address(attestation.attester),
        uint(attestation.time),
        uint(attestation.expiration_time),
        AbiValue::Bool(attestation.revocable),
        word(attestation.ref_uid.as_b256()),
        AbiValue::Bytes(attestation.data.clone()),
        AbiValue::Uint(U256::from(bump)),
    ];
    Ok(keccak256(encode_packed(&types, &values)?))
}

fn empty_attestation() -> Attestation {
    Attestation {
        uid: AttestationUid::ZERO,
        schema: SchemaUid::ZERO,
        time: 0,
        expiration_time: 0,
        revocation_time: 0,
        ref_uid: AttestationUid::ZERO,
        recipient: Address::ZERO,
        attester: Address::ZERO,
        revocable: false,
        data: Vec::new(),
    }
}

fn address_topic(address: Address) -> B256 {
    address.into_word()
}

fn single_word(function: &Function, calldata: &[u8]) -> Result<B256, TransportError> {
    let args = function.decode_call(calldata).map_err(invalid_calldata)?;
    args.first()
        .ok_or_else(|| TransportError::Reverted("invalid calldata".into()))
        .and_then(|arg| as_b256(arg).map_err(invalid_calldata))
}

fn output(function: &Function, values: &[AbiValue]) -> Result<Vec<u8>, TransportError> {
    function
        .encode_output(values)
        .map_err(|e| TransportError::Malformed(format!("{}: {e}", function.name())))
}

fn invalid_calldata(err: impl std::fmt::Display) -> TransportError {
    TransportError::Reverted(format!("invalid calldata: {err}"))
}

fn no_contract(to: Address) -> TransportError {
    TransportError::Reverted(format!("no contract at {to}"))
}

fn unknown_selector(calldata: &[u8]) -> TransportError {
    let selector = calldata.get(..4).unwrap_or(calldata);
    TransportError::Reverted(format!("unknown selector {}", hex::encode_prefixed(selector)))
}
