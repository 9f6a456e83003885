//! # Codec CLI — ABI-encode and decode attestation data.
//!
//! ```bash
//! # Standard encoding, as stored in an attestation:
//! eas encode "uint256 eventId, uint8 voteIndex" '["1", 2]'
//!
//! # Packed encoding, as hashed for UIDs:
//! eas encode --packed "string schema, address resolver, bool revocable" \
//!     '["bool isValid", "0x0000000000000000000000000000000000000000", true]'
//!
//! eas decode "uint256 eventId, uint8 voteIndex" 0x...
//! ```

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};

use alloy_primitives::hex;
use eas_core::{decode_values, encode_packed, encode_values, values_from_json, Schema};

/// `eas encode` arguments.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Schema declaration, e.g. "uint256 eventId, uint8 voteIndex".
    pub schema: String,

    /// JSON array with one value per field. Integers may be strings.
    pub values: String,

    /// Use packed encoding (abi.encodePacked) instead of standard.
    #[arg(long)]
    pub packed: bool,
}

/// `eas decode` arguments.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Schema declaration the data was encoded against.
    pub schema: String,

    /// 0x-prefixed hex data.
    pub data: String,
}

/// Execute `eas encode`.
pub fn run_encode(args: &EncodeArgs) -> Result<u8> {
    println!("{}", encode_json(&args.schema, &args.values, args.packed)?);
    Ok(0)
}

/// Execute `eas decode`.
pub fn run_decode(args: &DecodeArgs) -> Result<u8> {
    let decoded = decode_hex(&args.schema, &args.data)?;
    println!("{}", serde_json::to_string_pretty(&decoded)?);
    Ok(0)
}

/// Encode a JSON array of values against `schema`, returning `0x` hex.
pub fn encode_json(schema: &str, values: &str, packed: bool) -> Result<String> {
    let json: Value = serde_json::from_str(values).context("values must be a JSON array")?;
    let values = values_from_json(schema, &json)?;
    let bytes = if packed {
        let types = Schema::parse(schema)?.types();
        encode_packed(&types, &values)?
    } else {
        encode_values(schema, &values)?
    };
    tracing::debug!(bytes = bytes.len(), packed, "encoded");
    Ok(hex::encode_prefixed(bytes))
}

/// Decode `0x` hex against `schema` into `[{name, type, value}]`.
pub fn decode_hex(schema: &str, data: &str) -> Result<Value> {
    let bytes = hex::decode(data.trim()).context("data must be hex")?;
    let parsed = Schema::parse(schema)?;
    let values = decode_values(schema, &bytes)?;
    let fields = parsed
        .fields()
        .iter()
        .zip(&values)
        .map(|(field, value)| {
            json!({
                "name": field.name,
                "type": field.ty.to_string(),
                "value": value.to_json(),
            })
        })
        .collect();
    Ok(Value::Array(fields))
}
