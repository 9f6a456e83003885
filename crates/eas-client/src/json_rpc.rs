//! # JSON-RPC Contract Transport
//!
//! A [`ContractTransport`] over an Ethereum JSON-RPC endpoint.
//!
//! ## How It Works
//!
//! 1. Reads use `eth_call` against the `latest` block.
//! 2. Writes use `eth_sendTransaction`. The endpoint signs for the
//!    configured `sender`; this transport holds no keys.
//! 3. After submission the transport polls `eth_getTransactionReceipt`
//!    until a receipt appears or the configured attempts run out.
//!
//! The transport is blocking. It drives its requests on a private
//! current-thread Tokio runtime and must not be used from inside another
//! runtime's async context.
//!
//! ## Error Mapping
//!
//! - Connection failures and non-2xx statuses become
//!   [`TransportError::Unavailable`], after retrying connection failures.
//! - JSON-RPC error code 3, or a message mentioning `revert`, becomes
//!   [`TransportError::Reverted`]. Other JSON-RPC errors become
//!   [`TransportError::Rpc`].

use std::time::Duration;

use alloy_primitives::{hex, Address, B256, U256};
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::retry::retry_send;
use crate::transport::{ContractTransport, LogEntry, TxReceipt};

/// JSON-RPC error code for `execution reverted`.
const REVERT_ERROR_CODE: i64 = 3;

/// Blocking JSON-RPC transport.
#[derive(Debug)]
pub struct JsonRpcTransport {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    config: ClientConfig,
}

impl JsonRpcTransport {
    /// Create a transport from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        config
            .validate()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Unavailable(format!("failed to start runtime: {e}")))?;
        Ok(Self {
            client,
            runtime,
            config,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a JSON-RPC request and return the result field.
    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, TransportError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = retry_send(self.config.rpc_retries, || {
            self.client.post(&self.config.rpc_url).json(&body).send()
        })
        .await
        .map_err(|e| {
            if e.is_timeout() {
                TransportError::Unavailable(format!("{method}: request timed out"))
            } else {
                TransportError::Unavailable(format!("{method}: {e}"))
            }
        })?;

        if !resp.status().is_success() {
            return Err(TransportError::Unavailable(format!(
                "{method}: HTTP {}",
                resp.status()
            )));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| TransportError::Malformed(format!("{method}: invalid JSON response: {e}")))?;

        if let Some(error) = json.get("error") {
            let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown RPC error")
                .to_string();
            if code == REVERT_ERROR_CODE || message.contains("revert") {
                return Err(TransportError::Reverted(message));
            }
            return Err(TransportError::Rpc { code, message });
        }

        json.get("result").cloned().ok_or_else(|| {
            TransportError::Malformed(format!("{method}: response missing 'result' field"))
        })
    }

    async fn submit(&self, to: Address, tx: serde_json::Value) -> Result<TxReceipt, TransportError> {
        let result = self
            .rpc_call("eth_sendTransaction", serde_json::json!([tx]))
            .await?;
        let tx_hash = result
            .as_str()
            .and_then(|s| s.parse::<B256>().ok())
            .ok_or_else(|| {
                TransportError::Malformed("eth_sendTransaction returned no transaction hash".into())
            })?;
        tracing::info!(%tx_hash, %to, "transaction submitted");
        self.wait_for_receipt(tx_hash).await
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, TransportError> {
        let interval = Duration::from_millis(self.config.receipt_poll_interval_ms);
        let attempts = self.config.receipt_poll_attempts;
        for attempt in 1..=attempts {
            let receipt = self
                .rpc_call("eth_getTransactionReceipt", serde_json::json!([tx_hash]))
                .await?;
            // Null receipt means the transaction is still pending.
            if !receipt.is_null() {
                return parse_receipt(receipt);
            }
            tracing::debug!(%tx_hash, attempt, attempts, "transaction pending");
            if attempt < attempts {
                tokio::time::sleep(interval).await;
            }
        }
        Err(TransportError::Timeout { tx_hash, attempts })
    }
}

impl ContractTransport for JsonRpcTransport {
    fn call(&self, to: Address, calldata: &[u8]) -> Result<Vec<u8>, TransportError> {
        let params = serde_json::json!([
            {
                "from": self.config.sender,
                "to": to,
                "data": hex::encode_prefixed(calldata),
            },
            "latest"
        ]);
        let result = self
            .runtime
            .block_on(self.rpc_call("eth_call", params))?;
        let data = result
            .as_str()
            .ok_or_else(|| TransportError::Malformed("eth_call returned non-string result".into()))?;
        hex::decode(data).map_err(|e| TransportError::Malformed(format!("eth_call result: {e}")))
    }

    fn send(&self, to: Address, calldata: &[u8], value: U256) -> Result<TxReceipt, TransportError> {
        let tx = serde_json::json!({
            "from": self.config.sender,
            "to": to,
            "data": hex::encode_prefixed(calldata),
            "value": format!("{value:#x}"),
        });
        self.runtime.block_on(self.submit(to, tx))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: B256,
    block_number: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

#[derive(Deserialize)]
struct RpcLog {
    address: Address,
    #[serde(default)]
    topics: Vec<B256>,
    data: String,
}

fn parse_receipt(value: serde_json::Value) -> Result<TxReceipt, TransportError> {
    let receipt: RpcReceipt = serde_json::from_value(value)
        .map_err(|e| TransportError::Malformed(format!("transaction receipt: {e}")))?;
    let logs = receipt
        .logs
        .into_iter()
        .map(|log| {
            let data = hex::decode(&log.data)
                .map_err(|e| TransportError::Malformed(format!("log data: {e}")))?;
            Ok(LogEntry {
                address: log.address,
                topics: log.topics,
                data,
            })
        })
        .collect::<Result<Vec<_>, TransportError>>()?;
    Ok(TxReceipt {
        tx_hash: receipt.transaction_hash,
        block_number: parse_quantity(&receipt.block_number)?,
        // Pre-Byzantium receipts carry no status.
        success: receipt.status.as_deref() != Some("0x0"),
        logs,
    })
}

fn parse_quantity(raw: &str) -> Result<u64, TransportError> {
    u64::from_str_radix(raw.trim_start_matches("0x"), 16)
        .map_err(|e| TransportError::Malformed(format!("quantity {raw:?}: {e}")))
}
