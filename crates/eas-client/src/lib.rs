//! # eas-client — Registry and Attestation Facade
//!
//! Domain operations of the Ethereum Attestation Service, built on the
//! `eas-core` codec and a pluggable [`ContractTransport`]:
//!
//! - [`SchemaRegistry`]: register a schema, read a schema record.
//! - [`Eas`]: attest, revoke, timestamp, read attestations.
//!
//! ## Transports
//!
//! - [`InMemoryEas`] emulates both contracts in process, for tests and
//!   dry runs.
//! - `JsonRpcTransport` (feature `json-rpc`) talks to a node over HTTP
//!   using `eth_call` and `eth_sendTransaction`.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use eas_client::{InMemoryEas, SchemaRegistry};
//! use eas_core::{Address, SchemaDescription};
//!
//! let chain = Arc::new(InMemoryEas::new(Address::with_last_byte(1)));
//! let registry = SchemaRegistry::new(chain.clone(), chain.registry_address());
//! let uid = registry.register(&SchemaDescription::new("bool isValid")).unwrap();
//! assert!(registry.get_schema(uid).unwrap().is_some());
//! ```

pub mod config;
pub mod contract;
pub mod eas;
pub mod error;
pub mod in_memory;
pub mod registry;
pub mod transport;
pub mod types;

#[cfg(feature = "json-rpc")]
pub mod json_rpc;
#[cfg(feature = "json-rpc")]
mod retry;

pub use config::{ClientConfig, ConfigError};
pub use eas::Eas;
pub use error::{ClientError, TransportError};
pub use in_memory::{Clock, Impersonated, InMemoryEas};
pub use registry::SchemaRegistry;
pub use transport::{ContractTransport, LogEntry, TxReceipt};
pub use types::{
    Attestation, AttestationOptions, AttestationRequest, AttestationUid, RevocationRequest,
    SchemaRecord,
};

#[cfg(feature = "json-rpc")]
pub use json_rpc::JsonRpcTransport;
