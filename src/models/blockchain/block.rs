//! Block data structures.

use alloy::primitives::{Address, B256, B64, U256, U64};
use serde::{Deserialize, Serialize};

use super::quantity;

/// Block header as returned by `eth_getBlockByNumber` / `eth_getBlockByHash` with
/// transaction hashes only.
///
/// Every field defaults when absent so partial replies (for example a bare
/// `{"number":"0x10"}`) still decode.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockResponse {
	/// Block number
	pub number: U64,
	/// Hash of the block, absent for pending blocks
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hash: Option<B256>,
	/// Hash of the parent
	pub parent_hash: B256,
	/// Hash of the uncles
	#[serde(rename = "sha3Uncles")]
	pub uncles_hash: B256,
	/// Miner/author's address
	#[serde(skip_serializing_if = "Option::is_none")]
	pub miner: Option<Address>,
	pub state_root: B256,
	pub receipts_root: B256,
	pub transactions_root: B256,
	pub mix_hash: B256,
	pub logs_bloom: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub difficulty: Option<U256>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub nonce: Option<B64>,
	pub gas_limit: U64,
	pub gas_used: U64,
	pub extra_data: String,
	/// Size in bytes
	pub size: U64,
	/// Unix time in seconds
	pub timestamp: U64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub total_difficulty: Option<U256>,
	/// Transaction hashes in block order
	pub transactions: Vec<B256>,
	pub uncles: Vec<B256>,
}

impl BlockResponse {
	pub fn block_number(&self) -> u64 {
		self.number.to::<u64>()
	}

	pub fn block_hash(&self) -> Option<B256> {
		self.hash
	}

	pub fn block_timestamp(&self) -> u64 {
		self.timestamp.to::<u64>()
	}
}

/// Block record in the shape published to downstream consumers.
///
/// Integer fields accept either JSON numbers or hex quantities.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Block {
	#[serde(deserialize_with = "quantity::deserialize")]
	pub number: u64,
	pub hash: B256,
	pub parent_hash: B256,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub nonce: u64,
	pub mix_hash: B256,
	pub logs_bloom: String,
	pub state_root: B256,
	/// Block producer
	#[serde(rename = "coinbase")]
	pub miner: Address,
	pub difficulty: Option<U256>,
	pub total_difficulty: Option<U256>,
	pub extra_data: String,
	pub size: U64,
	pub gas_limit: U64,
	pub gas_used: U64,
	pub timestamp: U64,
	pub transactions_root: B256,
	pub transactions: Vec<B256>,
	pub receipts_root: B256,
}

impl Block {
	pub fn block_number(&self) -> u64 {
		self.number
	}

	pub fn block_hash(&self) -> B256 {
		self.hash
	}

	pub fn block_timestamp(&self) -> u64 {
		self.timestamp.to::<u64>()
	}
}

impl From<BlockResponse> for Block {
	fn from(block: BlockResponse) -> Self {
		Self {
			number: block.block_number(),
			hash: block.hash.unwrap_or_default(),
			parent_hash: block.parent_hash,
			nonce: block.nonce.map(|n| u64::from_be_bytes(n.0)).unwrap_or_default(),
			mix_hash: block.mix_hash,
			logs_bloom: block.logs_bloom,
			state_root: block.state_root,
			miner: block.miner.unwrap_or_default(),
			difficulty: block.difficulty,
			total_difficulty: block.total_difficulty,
			extra_data: block.extra_data,
			size: block.size,
			gas_limit: block.gas_limit,
			gas_used: block.gas_used,
			timestamp: block.timestamp,
			transactions_root: block.transactions_root,
			transactions: block.transactions,
			receipts_root: block.receipts_root,
		}
	}
}
