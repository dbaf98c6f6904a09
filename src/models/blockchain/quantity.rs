//! Serde helper for integer fields that arrive either as `0x` quantities or as JSON numbers.
//!
//! Node replies encode integers as hex strings while stream records carry plain numbers.
//! Use with `#[serde(deserialize_with = "quantity::deserialize")]`; `null` decodes as zero.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
	Number(u64),
	String(String),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<NumberOrString>::deserialize(deserializer)? {
		None => Ok(0),
		Some(NumberOrString::Number(value)) => Ok(value),
		Some(NumberOrString::String(raw)) => parse_quantity(&raw).map_err(de::Error::custom),
	}
}

/// Parses `0x`-prefixed hex or plain decimal into a `u64`
pub fn parse_quantity(raw: &str) -> Result<u64, String> {
	let raw = raw.trim();
	match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
		Some(hex) => u64::from_str_radix(hex, 16)
			.map_err(|e| format!("invalid hex quantity {:?}: {}", raw, e)),
		None => raw
			.parse::<u64>()
			.map_err(|e| format!("invalid decimal quantity {:?}: {}", raw, e)),
	}
}
