use crate::models::BlockResponse;
use alloy::primitives::{Address, B256, U64};

/// A builder for creating test block headers with default values.
#[derive(Debug, Default)]
pub struct BlockBuilder {
	number: Option<u64>,
	hash: Option<B256>,
	parent_hash: Option<B256>,
	miner: Option<Address>,
	timestamp: Option<u64>,
	transactions: Vec<B256>,
}

impl BlockBuilder {
	/// Creates a new BlockBuilder instance.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the block number. Default is 0.
	pub fn number(mut self, number: u64) -> Self {
		self.number = Some(number);
		self
	}

	pub fn hash(mut self, hash: B256) -> Self {
		self.hash = Some(hash);
		self
	}

	pub fn parent_hash(mut self, parent_hash: B256) -> Self {
		self.parent_hash = Some(parent_hash);
		self
	}

	pub fn miner(mut self, miner: Address) -> Self {
		self.miner = Some(miner);
		self
	}

	pub fn timestamp(mut self, timestamp: u64) -> Self {
		self.timestamp = Some(timestamp);
		self
	}

	/// Appends a transaction hash to the block body.
	pub fn transaction(mut self, hash: B256) -> Self {
		self.transactions.push(hash);
		self
	}

	pub fn build(self) -> BlockResponse {
		BlockResponse {
			number: U64::from(self.number.unwrap_or_default()),
			hash: Some(self.hash.unwrap_or(B256::with_last_byte(1))),
			parent_hash: self.parent_hash.unwrap_or_default(),
			miner: self.miner,
			timestamp: U64::from(self.timestamp.unwrap_or(1_700_000_000)),
			transactions: self.transactions,
			..Default::default()
		}
	}

	/// Builds the block and renders it the way a node would send it.
	pub fn build_json(self) -> serde_json::Value {
		serde_json::to_value(self.build()).unwrap_or_default()
	}
}
