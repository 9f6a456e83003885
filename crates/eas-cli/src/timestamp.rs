//! # Timestamp CLI — Record and read on-chain timestamps of 32-byte values.

use alloy_primitives::B256;
use anyhow::Result;
use clap::{Args, Subcommand};

use crate::format_time;
use crate::network::NetworkOpts;

/// Timestamp subcommand arguments.
#[derive(Args, Debug)]
pub struct TimestampArgs {
    #[command(subcommand)]
    pub command: TimestampCommand,
}

/// Available timestamp subcommands.
#[derive(Subcommand, Debug)]
pub enum TimestampCommand {
    /// Timestamp a value and print the recorded time.
    Create {
        /// 32-byte value, 0x-prefixed hex.
        data: B256,
    },

    /// Print when a value was timestamped.
    Get {
        /// 32-byte value, 0x-prefixed hex.
        data: B256,
    },
}

/// Execute the timestamp subcommand.
pub fn run_timestamp(args: &TimestampArgs, network: &NetworkOpts) -> Result<u8> {
    let clients = network.connect()?;
    match &args.command {
        TimestampCommand::Create { data } => {
            let time = clients.eas.timestamp(*data)?;
            println!("{time} ({})", format_time(time));
            Ok(0)
        }
        TimestampCommand::Get { data } => {
            let time = clients.eas.get_timestamp(*data)?;
            if time == 0 {
                eprintln!("{data} has not been timestamped");
                return Ok(1);
            }
            println!("{time} ({})", format_time(time));
            Ok(0)
        }
    }
}
