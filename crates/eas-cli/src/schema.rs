//! # Schema CLI — Normalize, identify, register and fetch schemas.
//!
//! ```bash
//! eas schema normalize "(uint256 eventId, uint8 voteIndex)"
//! eas schema uid "bool isValid" --irrevocable
//! eas schema parse "uint8 a, tuple(bool b, string c) d"
//! eas --config sepolia.yaml schema register "bool isValid"
//! eas --config sepolia.yaml schema get 0x3bd9...
//! ```

use alloy_primitives::Address;
use anyhow::Result;
use clap::{Args, Subcommand};

use eas_core::{normalize, Schema, SchemaDescription, SchemaUid};

use crate::network::NetworkOpts;

/// Schema subcommand arguments.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

/// Resolver and revocability of a schema.
#[derive(Args, Debug, Clone)]
pub struct DescriptionArgs {
    /// Schema declaration.
    pub schema: String,

    /// Resolver contract address.
    #[arg(long, default_value_t = Address::ZERO)]
    pub resolver: Address,

    /// Register attestations under this schema as irrevocable.
    #[arg(long)]
    pub irrevocable: bool,
}

impl DescriptionArgs {
    fn description(&self) -> SchemaDescription {
        SchemaDescription::new(self.schema.clone())
            .with_resolver(self.resolver)
            .revocable(!self.irrevocable)
    }
}

/// Available schema subcommands.
#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// Print the canonical form that gets hashed.
    Normalize {
        /// Schema declaration.
        schema: String,
    },

    /// Derive the schema UID without touching the chain.
    Uid(DescriptionArgs),

    /// List the fields of a schema with their ABI types.
    Parse {
        /// Schema declaration.
        schema: String,
    },

    /// Register a schema and print its UID.
    Register(DescriptionArgs),

    /// Fetch a registered schema.
    Get {
        /// Schema UID.
        uid: SchemaUid,
    },
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs, network: &NetworkOpts) -> Result<u8> {
    match &args.command {
        SchemaCommand::Normalize { schema } => {
            println!("{}", normalize(schema)?);
            Ok(0)
        }
        SchemaCommand::Uid(desc) => {
            println!("{}", desc.description().uid()?);
            Ok(0)
        }
        SchemaCommand::Parse { schema } => run_parse(schema),
        SchemaCommand::Register(desc) => {
            let clients = network.connect()?;
            let uid = clients.registry.register(&desc.description())?;
            println!("{uid}");
            Ok(0)
        }
        SchemaCommand::Get { uid } => {
            let clients = network.connect()?;
            match clients.registry.get_schema(*uid)? {
                Some(record) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                    Ok(0)
                }
                None => {
                    eprintln!("schema {uid} is not registered");
                    Ok(1)
                }
            }
        }
    }
}

fn run_parse(schema: &str) -> Result<u8> {
    let parsed = Schema::parse(schema)?;
    println!("canonical: {}", parsed.canonical());
    println!("signature: {}", parsed.signature());
    for (i, field) in parsed.fields().iter().enumerate() {
        println!("  {i:>3}  {field}");
    }
    Ok(0)
}
