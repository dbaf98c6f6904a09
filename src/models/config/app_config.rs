//! Runtime configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `MAVIS_RPC` | `https://api.roninchain.com/rpc` |
//! | `ETERNITY_RPC` | required |
//! | `INFINITY_RPC`, `INFINITY_NV_RPC`, `CATALYST_RPC` | unset |
//! | `INFINITY_GROUP_ID` | `4282374336` |
//! | `RONIN_NODE_GROUP_ID` | `947505775` |
//! | `MAX_BLOCK_DELAY` | `5` |
//! | `TELEGRAM_BOT_TOKEN` | required |
//! | `POLL_INTERVAL_MS` | `1000` |
//! | `RPC_TIMEOUT_SECS` | `10` |
//! | `MAX_RPC_FAILURES` | `1` |

use std::{collections::HashMap, env, str::FromStr, time::Duration};
use url::Url;

use super::ConfigError;
use crate::models::SecretString;

pub const DEFAULT_REFERENCE_RPC: &str = "https://api.roninchain.com/rpc";
pub const DEFAULT_DELAY_GROUP_ID: u64 = 4282374336;
pub const DEFAULT_NODE_GROUP_ID: u64 = 947505775;
pub const DEFAULT_MAX_BLOCK_DELAY: u64 = 5;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_RPC_FAILURES: u32 = 1;

/// Optional audited nodes: (env var, display name)
const OPTIONAL_NODES: [(&str, &str); 3] = [
	("INFINITY_RPC", "Infinity"),
	("INFINITY_NV_RPC", "Infinity non-validator"),
	("CATALYST_RPC", "Catalyst"),
];

/// A named RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEndpoint {
	pub name: String,
	pub url: String,
}

impl NodeEndpoint {
	pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			url: url.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
	/// Node whose tip is treated as the truth
	pub reference: NodeEndpoint,
	/// Nodes compared against the reference, in alerting order
	pub audited: Vec<NodeEndpoint>,
	/// Chat receiving block-delay alerts
	pub delay_group_id: u64,
	/// Chat receiving reachability alerts and the startup message
	pub node_group_id: u64,
	/// Lag in blocks tolerated before alerting
	pub max_block_delay: u64,
	pub telegram_bot_token: SecretString,
	pub poll_interval: Duration,
	pub rpc_timeout: Duration,
	/// Consecutive failed fetches before a node is reported unreachable
	pub max_rpc_failures: u32,
}

impl AppConfig {
	/// Reads the configuration from the process environment and validates it
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Reads the configuration through `lookup` and validates it.
	///
	/// Empty values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

		let reference = NodeEndpoint::new(
			"Skymavis",
			get("MAVIS_RPC").unwrap_or_else(|| DEFAULT_REFERENCE_RPC.to_string()),
		);

		let eternity = get("ETERNITY_RPC").ok_or_else(|| missing("ETERNITY_RPC"))?;
		let mut audited = vec![NodeEndpoint::new("Eternity", eternity)];
		audited.extend(
			OPTIONAL_NODES
				.iter()
				.filter_map(|&(key, name)| get(key).map(|url| NodeEndpoint::new(name, url))),
		);

		let telegram_bot_token = get("TELEGRAM_BOT_TOKEN")
			.map(SecretString::new)
			.ok_or_else(|| missing("TELEGRAM_BOT_TOKEN"))?;

		let config = Self {
			reference,
			audited,
			delay_group_id: parse_or(&get, "INFINITY_GROUP_ID", DEFAULT_DELAY_GROUP_ID)?,
			node_group_id: parse_or(&get, "RONIN_NODE_GROUP_ID", DEFAULT_NODE_GROUP_ID)?,
			max_block_delay: parse_or(&get, "MAX_BLOCK_DELAY", DEFAULT_MAX_BLOCK_DELAY)?,
			telegram_bot_token,
			poll_interval: Duration::from_millis(parse_or(
				&get,
				"POLL_INTERVAL_MS",
				DEFAULT_POLL_INTERVAL_MS,
			)?),
			rpc_timeout: Duration::from_secs(parse_or(
				&get,
				"RPC_TIMEOUT_SECS",
				DEFAULT_RPC_TIMEOUT_SECS,
			)?),
			max_rpc_failures: parse_or(&get, "MAX_RPC_FAILURES", DEFAULT_MAX_RPC_FAILURES)?,
		};

		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		for endpoint in std::iter::once(&self.reference).chain(self.audited.iter()) {
			validate_url(endpoint)?;
		}

		if self.audited.is_empty() {
			return Err(ConfigError::validation_error(
				"At least one audited node is required",
				None,
				None,
			));
		}
		if self.telegram_bot_token.is_empty() {
			return Err(ConfigError::validation_error(
				"Telegram bot token cannot be empty",
				None,
				None,
			));
		}
		if self.poll_interval.is_zero() {
			return Err(ConfigError::validation_error(
				"Poll interval must be greater than zero",
				None,
				Some(key_metadata("POLL_INTERVAL_MS")),
			));
		}
		if self.rpc_timeout.is_zero() {
			return Err(ConfigError::validation_error(
				"RPC timeout must be greater than zero",
				None,
				Some(key_metadata("RPC_TIMEOUT_SECS")),
			));
		}
		if self.max_rpc_failures == 0 {
			return Err(ConfigError::validation_error(
				"Max RPC failures must be at least 1",
				None,
				Some(key_metadata("MAX_RPC_FAILURES")),
			));
		}
		Ok(())
	}
}

fn key_metadata(key: &str) -> HashMap<String, String> {
	HashMap::from([("key".to_string(), key.to_string())])
}

fn missing(key: &str) -> ConfigError {
	ConfigError::parse_error(
		format!("Missing {} environment variable", key),
		None,
		Some(key_metadata(key)),
	)
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
	G: Fn(&str) -> Option<String>,
	T: FromStr,
	T::Err: std::error::Error + Send + Sync + 'static,
{
	match get(key) {
		Some(raw) => raw.trim().parse::<T>().map_err(|e| {
			ConfigError::parse_error(
				format!("Invalid value {:?} for {}", raw, key),
				Some(Box::new(e)),
				Some(key_metadata(key)),
			)
		}),
		None => Ok(default),
	}
}

fn validate_url(endpoint: &NodeEndpoint) -> Result<(), ConfigError> {
	let metadata = HashMap::from([
		("node".to_string(), endpoint.name.clone()),
		("url".to_string(), endpoint.url.clone()),
	]);

	let url = Url::parse(&endpoint.url).map_err(|e| {
		ConfigError::validation_error(
			format!("Invalid RPC URL for {}", endpoint.name),
			Some(Box::new(e)),
			Some(metadata.clone()),
		)
	})?;

	match url.scheme() {
		"http" | "https" => Ok(()),
		scheme => Err(ConfigError::validation_error(
			format!("Unsupported RPC URL scheme {:?} for {}", scheme, endpoint.name),
			None,
			Some(metadata),
		)),
	}
}
