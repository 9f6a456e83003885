//! # Attestation CLI — Create, read, check and revoke attestations.
//!
//! `create` encodes `--data` against the schema. The schema string is taken
//! from `--schema` when given, otherwise fetched from the registry.

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use eas_client::{Attestation, AttestationOptions, AttestationRequest, AttestationUid};
use eas_core::{decode_values, encode_values, values_from_json, SchemaUid};

use crate::format_time;
use crate::network::NetworkOpts;

/// Attestation subcommand arguments.
#[derive(Args, Debug)]
pub struct AttestationArgs {
    #[command(subcommand)]
    pub command: AttestationCommand,
}

/// Available attestation subcommands.
#[derive(Subcommand, Debug)]
pub enum AttestationCommand {
    /// Create an attestation and print its UID.
    Create {
        /// UID of a registered schema.
        #[arg(long)]
        schema_uid: SchemaUid,

        /// Schema declaration; fetched from the registry when omitted.
        #[arg(long)]
        schema: Option<String>,

        /// Subject of the attestation.
        #[arg(long, default_value_t = Address::ZERO)]
        recipient: Address,

        /// JSON array with one value per schema field.
        #[arg(long)]
        data: String,

        /// Expiration time, unix seconds. Zero for none.
        #[arg(long, default_value_t = 0)]
        expiration: u64,

        /// Create an irrevocable attestation.
        #[arg(long)]
        irrevocable: bool,

        /// Attestation this one refers to.
        #[arg(long)]
        ref_uid: Option<AttestationUid>,
    },

    /// Print an attestation with its data decoded.
    Get {
        /// Attestation UID.
        uid: AttestationUid,
    },

    /// Exit 0 when the attestation exists, 1 otherwise.
    Valid {
        /// Attestation UID.
        uid: AttestationUid,
    },

    /// Revoke an attestation.
    Revoke {
        /// UID of the attestation's schema.
        #[arg(long)]
        schema_uid: SchemaUid,

        /// Attestation UID.
        uid: AttestationUid,
    },
}

/// Execute the attestation subcommand.
pub fn run_attestation(args: &AttestationArgs, network: &NetworkOpts) -> Result<u8> {
    let clients = network.connect()?;
    match &args.command {
        AttestationCommand::Create {
            schema_uid,
            schema,
            recipient,
            data,
            expiration,
            irrevocable,
            ref_uid,
        } => {
            let schema = match schema {
                Some(schema) => schema.clone(),
                None => {
                    clients
                        .registry
                        .get_schema(*schema_uid)?
                        .with_context(|| format!("schema {schema_uid} is not registered"))?
                        .schema
                }
            };
            let json: Value = serde_json::from_str(data).context("--data must be a JSON array")?;
            let encoded = encode_values(&schema, &values_from_json(&schema, &json)?)?;
            let request = AttestationRequest::new(*schema_uid, *recipient, encoded).with_options(
                AttestationOptions {
                    expiration_time: *expiration,
                    revocable: !irrevocable,
                    ref_uid: ref_uid.unwrap_or(AttestationUid::ZERO),
                    ..AttestationOptions::default()
                },
            );
            println!("{}", clients.eas.attest(&request)?);
            Ok(0)
        }
        AttestationCommand::Get { uid } => {
            let Some(attestation) = clients.eas.get_attestation(*uid)? else {
                eprintln!("attestation {uid} not found");
                return Ok(1);
            };
            let schema = clients
                .registry
                .get_schema(attestation.schema)?
                .map(|record| record.schema);
            println!("{}", serde_json::to_string_pretty(&render(&attestation, schema.as_deref())?)?);
            Ok(0)
        }
        AttestationCommand::Valid { uid } => {
            let valid = clients.eas.is_attestation_valid(*uid)?;
            println!("{valid}");
            Ok(if valid { 0 } else { 1 })
        }
        AttestationCommand::Revoke { schema_uid, uid } => {
            let receipt = clients.eas.revoke(*schema_uid, *uid)?;
            println!("revoked {uid} in block {}", receipt.block_number);
            Ok(0)
        }
    }
}

/// JSON view of an attestation with readable times and, when the schema is
/// known, decoded data.
pub fn render(attestation: &Attestation, schema: Option<&str>) -> Result<Value> {
    let mut json = serde_json::to_value(attestation)?;
    let Some(object) = json.as_object_mut() else {
        bail!("attestation did not serialize to an object");
    };
    for (key, secs) in [
        ("time", attestation.time),
        ("expirationTime", attestation.expiration_time),
        ("revocationTime", attestation.revocation_time),
    ] {
        object.insert(format!("{key}Utc"), Value::String(format_time(secs)));
    }
    if let Some(schema) = schema {
        let values = decode_values(schema, &attestation.data)
            .with_context(|| format!("data does not decode against {schema:?}"))?;
        object.insert(
            "decoded".to_string(),
            Value::Array(values.iter().map(|v| v.to_json()).collect()),
        );
    }
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use eas_core::AbiValue;

    fn attestation(data: Vec<u8>) -> Attestation {
        Attestation {
            uid: AttestationUid::new(B256::repeat_byte(1)),
            schema: SchemaUid::new(B256::repeat_byte(2)),
            time: 1_700_000_000,
            expiration_time: 0,
            revocation_time: 0,
            ref_uid: AttestationUid::ZERO,
            recipient: Address::ZERO,
            attester: Address::with_last_byte(1),
            revocable: true,
            data,
        }
    }

    #[test]
    fn render_adds_times_and_decoded_data() {
        let data = encode_values("bool isValid", &[AbiValue::Bool(true)]).unwrap();
        let json = render(&attestation(data), Some("bool isValid")).unwrap();
        assert_eq!(json["timeUtc"], "2023-11-14T22:13:20+00:00");
        assert_eq!(json["expirationTimeUtc"], "never");
        assert_eq!(json["decoded"], serde_json::json!([true]));
    }

    #[test]
    fn render_without_schema_leaves_data_raw() {
        let json = render(&attestation(vec![0xab]), None).unwrap();
        assert_eq!(json["data"], "0xab");
        assert!(json.get("decoded").is_none());
    }

    #[test]
    fn render_reports_undecodable_data() {
        assert!(render(&attestation(vec![0xab]), Some("bool isValid")).is_err());
    }
}
