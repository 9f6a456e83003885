//! # Schema Registry Facade
//!
//! Registers schemas and reads them back. Registration submits the
//! normalized declaration and checks that the UID the registry reports in
//! its `Registered` event equals the UID derived locally, so a caller never
//! holds a UID the chain does not agree with.

use alloy_primitives::{Address, U256};
use eas_core::{AbiValue, SchemaDescription, SchemaUid};

use crate::contract::{GET_SCHEMA, REGISTER, REGISTERED};
use crate::error::{ClientError, TransportError};
use crate::transport::ContractTransport;
use crate::types::{word, SchemaRecord};

/// Client for the `SchemaRegistry` contract.
#[derive(Debug, Clone)]
pub struct SchemaRegistry<T> {
    transport: T,
    address: Address,
}

impl<T: ContractTransport> SchemaRegistry<T> {
    /// Bind to the registry deployed at `address`.
    pub fn new(transport: T, address: Address) -> Self {
        Self { transport, address }
    }

    /// The registry contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Register `description` and return its UID.
    ///
    /// # Errors
    ///
    /// [`ClientError::UidMismatch`] when the `Registered` event carries a
    /// different UID than [`SchemaDescription::uid()`];
    /// [`ClientError::MissingEvent`] when there is no such event.
    pub fn register(&self, description: &SchemaDescription) -> Result<SchemaUid, ClientError> {
        let expected = description.uid()?;
        let schema = description.normalized_schema()?;
        let calldata = REGISTER.encode_call(&[
            AbiValue::String(schema),
            AbiValue::Address(description.resolver),
            AbiValue::Bool(description.revocable),
        ])?;

        tracing::info!(uid = %expected, revocable = description.revocable, "registering schema");
        let receipt = self.transport.send(self.address, &calldata, U256::ZERO)?;
        if !receipt.success {
            return Err(TransportError::Reverted(format!(
                "register transaction {} failed",
                receipt.tx_hash
            ))
            .into());
        }

        let log = receipt
            .find_log(self.address, REGISTERED.topic0())
            .ok_or(ClientError::MissingEvent {
                event: REGISTERED.signature,
                tx_hash: receipt.tx_hash,
            })?;
        let actual = log
            .topics
            .get(1)
            .copied()
            .map(SchemaUid::new)
            .ok_or_else(|| ClientError::Malformed("Registered event without uid topic".into()))?;
        if actual != expected {
            return Err(ClientError::UidMismatch { expected, actual });
        }

        tracing::debug!(
            uid = %actual,
            tx = %receipt.tx_hash,
            block = receipt.block_number,
            "schema registered"
        );
        Ok(actual)
    }

    /// Fetch a registered schema. `None` when the registry has no record.
    pub fn get_schema(&self, uid: SchemaUid) -> Result<Option<SchemaRecord>, ClientError> {
        let calldata = GET_SCHEMA.encode_call(&[word(uid.as_b256())])?;
        let data = self.transport.call(self.address, &calldata)?;
        let values = GET_SCHEMA.decode_output(&data)?;
        let record = values
            .first()
            .ok_or_else(|| ClientError::Malformed("empty getSchema result".into()))
            .and_then(SchemaRecord::from_abi)?;
        Ok((!record.uid.is_zero()).then_some(record))
    }
}
