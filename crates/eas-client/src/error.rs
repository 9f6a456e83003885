//! # Error Types — Transport and Facade Failures
//!
//! [`TransportError`] is what a [`ContractTransport`](crate::ContractTransport)
//! reports; [`ClientError`] is what the facade returns. Core errors pass
//! through unchanged and are never retried.

use alloy_primitives::B256;
use eas_core::{DecodeError, EasError, EncodeError, SchemaUid};
use thiserror::Error;

/// Errors raised by a contract transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint could not be reached or answered with a non-2xx status.
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// The endpoint answered with a JSON-RPC error object.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the node.
        message: String,
    },

    /// The contract reverted the call or transaction.
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// No receipt appeared within the configured polling window.
    #[error("no receipt for transaction {tx_hash} after {attempts} polls")]
    Timeout {
        /// Hash of the submitted transaction.
        tx_hash: B256,
        /// Number of receipt polls made.
        attempts: u32,
    },

    /// The endpoint answered with something that is not a valid response.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors returned by the registry and attestation facades.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The transport failed or the contract reverted.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A core schema or encoding operation failed.
    #[error(transparent)]
    Core(#[from] EasError),

    /// Encoding call arguments or attestation data failed.
    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),

    /// Contract return data could not be decoded.
    #[error("decoding contract return data failed: {0}")]
    Decode(#[from] DecodeError),

    /// The transaction succeeded but did not emit the expected event.
    #[error("transaction {tx_hash} emitted no {event} event")]
    MissingEvent {
        /// Event signature that was looked for.
        event: &'static str,
        /// Hash of the transaction.
        tx_hash: B256,
    },

    /// The registry assigned a different UID than the one derived locally.
    #[error("schema UID mismatch: derived {expected}, registry reported {actual}")]
    UidMismatch {
        /// UID derived from the schema description.
        expected: SchemaUid,
        /// UID carried by the `Registered` event.
        actual: SchemaUid,
    },

    /// Return data decoded but did not have the expected shape.
    #[error("unexpected contract response: {0}")]
    Malformed(String),
}
