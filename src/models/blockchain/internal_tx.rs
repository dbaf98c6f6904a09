//! Internal (message-call) transaction record.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use super::quantity;

/// A call frame executed inside a transaction, as produced by the internals tracer
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InternalTransaction {
	pub opcode: String,
	/// Position among the internal transactions of the parent transaction
	#[serde(deserialize_with = "quantity::deserialize")]
	pub order: u64,
	pub transaction_hash: B256,
	pub hash: B256,
	#[serde(rename = "type")]
	pub call_type: String,
	pub value: U256,
	pub input: Bytes,
	pub output: Bytes,
	pub from: Address,
	pub to: Address,
	pub success: bool,
	/// Revert reason when `success` is false
	#[serde(rename = "reason")]
	pub error: String,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub height: u64,
	pub block_hash: B256,
	/// Position of the internal transaction in the block
	#[serde(deserialize_with = "quantity::deserialize")]
	pub index: u64,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub timestamp: u64,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub block_time: u64,
	pub published_time: i64,
}
