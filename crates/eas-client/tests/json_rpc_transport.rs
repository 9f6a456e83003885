//! # JSON-RPC Transport Against a Mock Node
//!
//! The transport is blocking, so each test starts the mock node on its own
//! runtime and then drives the facade from the test thread.

#![cfg(feature = "json-rpc")]

use eas_client::contract::{GET_TIMESTAMP, REGISTERED, TIMESTAMPED};
use eas_client::{
    ClientConfig, ClientError, ContractTransport, Eas, JsonRpcTransport, SchemaRegistry,
    TransportError,
};
use eas_core::{derive_schema_uid, Address, SchemaDescription, B256, U256};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EAS: Address = Address::with_last_byte(0x20);
const REGISTRY: Address = Address::with_last_byte(0x10);
const SENDER: Address = Address::with_last_byte(0x01);

fn start_node() -> (Runtime, MockServer) {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    (rt, server)
}

fn mount(rt: &Runtime, server: &MockServer, rpc_method: &str, response: serde_json::Value) {
    rt.block_on(
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(server),
    );
}

fn result(value: serde_json::Value) -> serde_json::Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": value })
}

fn transport(server: &MockServer) -> JsonRpcTransport {
    let config = ClientConfig::new(server.uri(), EAS, REGISTRY, SENDER).with_polling(3, 10);
    JsonRpcTransport::new(config).unwrap()
}

fn receipt(logs: serde_json::Value) -> serde_json::Value {
    json!({
        "transactionHash": B256::repeat_byte(0xaa),
        "blockNumber": "0x2a",
        "status": "0x1",
        "logs": logs,
    })
}

#[test]
fn eth_call_returns_decoded_output() {
    let (rt, server) = start_node();
    let encoded = GET_TIMESTAMP
        .encode_output(&[eas_core::AbiValue::uint(1_700_000_000)])
        .unwrap();
    mount(
        &rt,
        &server,
        "eth_call",
        result(json!(alloy_primitives::hex::encode_prefixed(encoded))),
    );

    let eas = Eas::new(transport(&server), EAS);
    assert_eq!(eas.get_timestamp(B256::repeat_byte(1)).unwrap(), 1_700_000_000);
}

#[test]
fn register_reads_uid_from_receipt_logs() {
    let (rt, server) = start_node();
    let expected = derive_schema_uid("bool isValid", Address::ZERO, true).unwrap();
    mount(&rt, &server, "eth_sendTransaction", result(json!(B256::repeat_byte(0xaa))));
    mount(
        &rt,
        &server,
        "eth_getTransactionReceipt",
        result(receipt(json!([{
            "address": REGISTRY,
            "topics": [REGISTERED.topic0(), expected.as_b256(), SENDER.into_word()],
            "data": "0x",
        }]))),
    );

    let registry = SchemaRegistry::new(transport(&server), REGISTRY);
    let uid = registry
        .register(&SchemaDescription::new("bool isValid"))
        .unwrap();
    assert_eq!(uid, expected);
}

#[test]
fn timestamp_reads_time_topic() {
    let (rt, server) = start_node();
    let data = B256::repeat_byte(0x5a);
    mount(&rt, &server, "eth_sendTransaction", result(json!(B256::repeat_byte(0xaa))));
    mount(
        &rt,
        &server,
        "eth_getTransactionReceipt",
        result(receipt(json!([{
            "address": EAS,
            "topics": [
                TIMESTAMPED.topic0(),
                data,
                B256::from(U256::from(1_234u64).to_be_bytes::<32>()),
            ],
            "data": "0x",
        }]))),
    );

    let eas = Eas::new(transport(&server), EAS);
    assert_eq!(eas.timestamp(data).unwrap(), 1_234);
}

#[test]
fn pending_receipt_times_out() {
    let (rt, server) = start_node();
    mount(&rt, &server, "eth_sendTransaction", result(json!(B256::repeat_byte(0xbb))));
    mount(&rt, &server, "eth_getTransactionReceipt", result(json!(null)));

    let err = transport(&server)
        .send(EAS, &[0u8; 4], U256::ZERO)
        .unwrap_err();
    assert_eq!(
        err,
        TransportError::Timeout {
            tx_hash: B256::repeat_byte(0xbb),
            attempts: 3,
        }
    );
}

#[test]
fn revert_error_maps_to_reverted() {
    let (rt, server) = start_node();
    mount(
        &rt,
        &server,
        "eth_call",
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 3, "message": "execution reverted: InvalidSchema" }
        }),
    );

    let eas = Eas::new(transport(&server), EAS);
    let err = eas.get_timestamp(B256::ZERO).unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(TransportError::Reverted(msg)) if msg.contains("InvalidSchema")
    ));
}

#[test]
fn other_rpc_errors_keep_their_code() {
    let (rt, server) = start_node();
    mount(
        &rt,
        &server,
        "eth_sendTransaction",
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "insufficient funds for gas" }
        }),
    );

    let err = transport(&server)
        .send(EAS, &[0u8; 4], U256::ZERO)
        .unwrap_err();
    assert_eq!(
        err,
        TransportError::Rpc {
            code: -32000,
            message: "insufficient funds for gas".into(),
        }
    );
}

#[test]
fn http_failure_is_unavailable() {
    let (rt, server) = start_node();
    rt.block_on(
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server),
    );

    let err = transport(&server).call(EAS, &[0u8; 4]).unwrap_err();
    assert!(matches!(err, TransportError::Unavailable(msg) if msg.contains("503")));
}

#[test]
fn failed_receipt_status_is_reported() {
    let (rt, server) = start_node();
    mount(&rt, &server, "eth_sendTransaction", result(json!(B256::repeat_byte(0xaa))));
    mount(
        &rt,
        &server,
        "eth_getTransactionReceipt",
        result(json!({
            "transactionHash": B256::repeat_byte(0xaa),
            "blockNumber": "0x1",
            "status": "0x0",
            "logs": [],
        })),
    );

    let receipt = transport(&server).send(EAS, &[0u8; 4], U256::ZERO).unwrap();
    assert!(!receipt.success);
    assert_eq!(receipt.block_number, 1);
}
