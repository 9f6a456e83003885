//! # Contract Transport
//!
//! The seam between the facade and a chain. A transport performs two
//! operations on raw calldata and knows nothing about EAS:
//!
//! - [`call`](ContractTransport::call): a read-only `eth_call`, returning
//!   ABI return data.
//! - [`send`](ContractTransport::send): submit a transaction and wait for
//!   its receipt.
//!
//! Implementations in this crate: [`InMemoryEas`](crate::InMemoryEas) and,
//! behind the `json-rpc` feature, `JsonRpcTransport`.
//!
//! ## Invariant
//!
//! `send` returns `Ok` only once a receipt exists. A reverted transaction
//! is reported either as [`TransportError::Reverted`] or as a receipt with
//! `success == false`; the facade treats both as failure.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// One log emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics; `topics[0]` is the event signature hash.
    pub topics: Vec<B256>,
    /// Non-indexed event data, ABI-encoded.
    #[serde(with = "crate::types::hex_data")]
    pub data: Vec<u8>,
}

impl LogEntry {
    /// True when this log was emitted by `address` with signature hash `topic0`.
    pub fn matches(&self, address: Address, topic0: B256) -> bool {
        self.address == address && self.topics.first() == Some(&topic0)
    }
}

/// The mined result of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction hash.
    pub tx_hash: B256,
    /// Block that included the transaction.
    pub block_number: u64,
    /// Execution status.
    pub success: bool,
    /// Emitted logs in order.
    pub logs: Vec<LogEntry>,
}

impl TxReceipt {
    /// The first log matching `address` and `topic0`.
    pub fn find_log(&self, address: Address, topic0: B256) -> Option<&LogEntry> {
        self.logs.iter().find(|log| log.matches(address, topic0))
    }
}

/// Executes contract calls and transactions.
pub trait ContractTransport: Send + Sync {
    /// Execute a read-only call against `to` and return the raw return data.
    fn call(&self, to: Address, calldata: &[u8]) -> Result<Vec<u8>, TransportError>;

    /// Submit a transaction to `to` carrying `value` wei and wait for its receipt.
    fn send(&self, to: Address, calldata: &[u8], value: U256) -> Result<TxReceipt, TransportError>;
}

impl<T: ContractTransport + ?Sized> ContractTransport for &T {
    fn call(&self, to: Address, calldata: &[u8]) -> Result<Vec<u8>, TransportError> {
        (**self).call(to, calldata)
    }

    fn send(&self, to: Address, calldata: &[u8], value: U256) -> Result<TxReceipt, TransportError> {
        (**self).send(to, calldata, value)
    }
}

impl<T: ContractTransport + ?Sized> ContractTransport for Arc<T> {
    fn call(&self, to: Address, calldata: &[u8]) -> Result<Vec<u8>, TransportError> {
        (**self).call(to, calldata)
    }

    fn send(&self, to: Address, calldata: &[u8], value: U256) -> Result<TxReceipt, TransportError> {
        (**self).send(to, calldata, value)
    }
}
