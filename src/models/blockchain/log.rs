//! Event log record.

use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

use super::quantity;

/// A log emitted by a transaction, as returned by `eth_getLogs` or embedded in a receipt
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Log {
	/// Emitting contract
	pub address: Address,
	pub topics: Vec<B256>,
	pub data: Bytes,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub block_number: u64,
	#[serde(rename = "transactionHash")]
	pub tx_hash: B256,
	#[serde(rename = "transactionIndex", deserialize_with = "quantity::deserialize")]
	pub tx_index: u64,
	pub block_hash: B256,
	/// Position of the log in the block
	#[serde(rename = "logIndex", deserialize_with = "quantity::deserialize")]
	pub index: u64,
	/// True when the log was dropped by a reorg
	pub removed: bool,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub timestamp: u64,
	pub published_time: i64,
}
