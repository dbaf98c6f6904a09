//! Parsing helpers for command-line values.

use byte_unit::Byte;
use std::str::FromStr;

/// Parses a human-readable size ("1GB", "500MB", "1024KiB") into bytes.
///
/// Used as a clap value parser for `--log-max-size`.
pub fn parse_string_to_bytes_size(s: &str) -> Result<u64, String> {
	Byte::from_str(s)
		.map(|byte| byte.as_u64())
		.map_err(|e| format!("Invalid size format: '{}'. Error: {}", s, e))
}
