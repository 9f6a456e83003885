//! # Attestation Facade
//!
//! Creates, revokes and reads attestations through the `EAS` contract.
//! Write operations submit a transaction and read their result from the
//! emitted event rather than from return data, since a transaction's
//! return value is not visible in its receipt.

use alloy_primitives::{Address, B256, U256};
use eas_core::{encode_record, AbiRecord, SchemaUid};

use crate::contract::{
    Event, ATTEST, ATTESTED, GET_ATTESTATION, GET_TIMESTAMP, IS_ATTESTATION_VALID, REVOKE,
    REVOKED, TIMESTAMP, TIMESTAMPED,
};
use crate::error::{ClientError, TransportError};
use crate::transport::{ContractTransport, LogEntry, TxReceipt};
use crate::types::{
    as_bool, as_u64, word, Attestation, AttestationOptions, AttestationRequest, AttestationUid,
    RevocationRequest,
};

/// Client for the `EAS` contract.
#[derive(Debug, Clone)]
pub struct Eas<T> {
    transport: T,
    address: Address,
}

impl<T: ContractTransport> Eas<T> {
    /// Bind to the EAS contract deployed at `address`.
    pub fn new(transport: T, address: Address) -> Self {
        Self { transport, address }
    }

    /// The EAS contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit an attestation and return its UID, read from the `Attested` event.
    pub fn attest(&self, request: &AttestationRequest) -> Result<AttestationUid, ClientError> {
        let calldata = ATTEST.encode_call(&[request.to_abi()])?;
        tracing::info!(
            schema = %request.schema,
            recipient = %request.recipient,
            bytes = request.data.len(),
            "submitting attestation"
        );
        let receipt = self.submit(&calldata, request.options.value, "attest")?;
        let log = self.expect_log(&receipt, ATTESTED)?;
        let uid = log
            .data
            .get(..32)
            .map(B256::from_slice)
            .map(AttestationUid::new)
            .ok_or_else(|| ClientError::Malformed("Attested event without uid".into()))?;
        tracing::debug!(%uid, tx = %receipt.tx_hash, "attestation created");
        Ok(uid)
    }

    /// Encode `record` against `schema` and attest it.
    ///
    /// The record's reflected schema must match `schema` exactly; see
    /// [`eas_core::encode_record`].
    pub fn attest_record<R: AbiRecord>(
        &self,
        schema_uid: SchemaUid,
        schema: &str,
        recipient: Address,
        record: &R,
        options: AttestationOptions,
    ) -> Result<AttestationUid, ClientError> {
        let data = encode_record(schema, record)?;
        let request = AttestationRequest::new(schema_uid, recipient, data).with_options(options);
        self.attest(&request)
    }

    /// Revoke an attestation.
    pub fn revoke(
        &self,
        schema_uid: SchemaUid,
        uid: AttestationUid,
    ) -> Result<TxReceipt, ClientError> {
        let request = RevocationRequest {
            schema: schema_uid,
            uid,
            value: U256::ZERO,
        };
        let calldata = REVOKE.encode_call(&[request.to_abi()])?;
        tracing::info!(%uid, schema = %schema_uid, "revoking attestation");
        let receipt = self.submit(&calldata, U256::ZERO, "revoke")?;
        self.expect_log(&receipt, REVOKED)?;
        Ok(receipt)
    }

    /// Timestamp `data` on chain and return the recorded time.
    pub fn timestamp(&self, data: B256) -> Result<u64, ClientError> {
        let calldata = TIMESTAMP.encode_call(&[word(data)])?;
        tracing::info!(%data, "timestamping");
        let receipt = self.submit(&calldata, U256::ZERO, "timestamp")?;
        let log = self.expect_log(&receipt, TIMESTAMPED)?;
        let time = log
            .topics
            .get(2)
            .ok_or_else(|| ClientError::Malformed("Timestamped event without time topic".into()))?;
        u64::try_from(U256::from_be_bytes(time.0))
            .map_err(|_| ClientError::Malformed(format!("timestamp {time} does not fit uint64")))
    }

    /// Fetch an attestation. `None` when the contract has no record.
    pub fn get_attestation(&self, uid: AttestationUid) -> Result<Option<Attestation>, ClientError> {
        let calldata = GET_ATTESTATION.encode_call(&[word(uid.as_b256())])?;
        let data = self.transport.call(self.address, &calldata)?;
        let values = GET_ATTESTATION.decode_output(&data)?;
        let attestation = values
            .first()
            .ok_or_else(|| ClientError::Malformed("empty getAttestation result".into()))
            .and_then(Attestation::from_abi)?;
        Ok((!attestation.uid.is_zero()).then_some(attestation))
    }

    /// Whether an attestation with this UID exists.
    pub fn is_attestation_valid(&self, uid: AttestationUid) -> Result<bool, ClientError> {
        let calldata = IS_ATTESTATION_VALID.encode_call(&[word(uid.as_b256())])?;
        let data = self.transport.call(self.address, &calldata)?;
        let values = IS_ATTESTATION_VALID.decode_output(&data)?;
        values
            .first()
            .ok_or_else(|| ClientError::Malformed("empty isAttestationValid result".into()))
            .and_then(as_bool)
    }

    /// The time `data` was timestamped, zero if never.
    pub fn get_timestamp(&self, data: B256) -> Result<u64, ClientError> {
        let calldata = GET_TIMESTAMP.encode_call(&[word(data)])?;
        let out = self.transport.call(self.address, &calldata)?;
        let values = GET_TIMESTAMP.decode_output(&out)?;
        values
            .first()
            .ok_or_else(|| ClientError::Malformed("empty getTimestamp result".into()))
            .and_then(as_u64)
    }

    fn submit(&self, calldata: &[u8], value: U256, what: &str) -> Result<TxReceipt, ClientError> {
        let receipt = self.transport.send(self.address, calldata, value)?;
        if !receipt.success {
            return Err(TransportError::Reverted(format!(
                "{what} transaction {} failed",
                receipt.tx_hash
            ))
            .into());
        }
        Ok(receipt)
    }

    fn expect_log<'a>(&self, receipt: &'a TxReceipt, event: Event) -> Result<&'a LogEntry, ClientError> {
        receipt
            .find_log(self.address, event.topic0())
            .ok_or(ClientError::MissingEvent {
                event: event.signature,
                tx_hash: receipt.tx_hash,
            })
    }
}
