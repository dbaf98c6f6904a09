//! Account state touched by a block.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::quantity;

/// Account whose state changed while executing a block
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirtyAccount {
	pub address: Address,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub nonce: u64,
	pub balance: Option<U256>,
	/// Storage root
	pub root: B256,
	pub code_hash: B256,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub block_number: u64,
	pub block_hash: B256,
	pub deleted: bool,
	pub suicided: bool,
	pub dirty_code: bool,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub index: u64,
	pub published_time: i64,
}
