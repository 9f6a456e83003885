//! # eas-cli — Command-Line Interface for the Ethereum Attestation Service
//!
//! Provides the `eas` binary.
//!
//! ## Subcommands
//!
//! - `eas schema` — Normalize, parse and derive UIDs offline; register and
//!   read schemas on chain.
//! - `eas encode` / `eas decode` — ABI-encode JSON values against a schema
//!   and decode attestation data back to JSON.
//! - `eas attestation` — Create, read, check and revoke attestations.
//! - `eas timestamp` — Timestamp a 32-byte value and read it back.
//!
//! Offline subcommands need no configuration. On-chain subcommands read a
//! YAML [`ClientConfig`](eas_client::ClientConfig) from `--config`:
//!
//! ```bash
//! eas schema uid "uint256 eventId, uint8 voteIndex"
//! eas encode "uint256 eventId, uint8 voteIndex" '["1", 2]'
//! eas --config sepolia.yaml schema register "bool isValid" --irrevocable
//! eas --config sepolia.yaml attestation create --schema-uid 0x... --data '[true]'
//! ```

pub mod attestation;
pub mod codec;
pub mod network;
pub mod schema;
pub mod timestamp;

/// Render unix seconds as RFC 3339, or `never` for zero.
pub fn format_time(secs: u64) -> String {
    if secs == 0 {
        return "never".to_string();
    }
    i64::try_from(secs)
        .ok()
        .and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .map_or_else(|| secs.to_string(), |t| t.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_renders_rfc3339() {
        assert_eq!(format_time(1_700_000_000), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn format_time_zero_is_never() {
        assert_eq!(format_time(0), "never");
    }

    #[test]
    fn format_time_out_of_range_falls_back_to_seconds() {
        assert_eq!(format_time(u64::MAX), u64::MAX.to_string());
    }
}
