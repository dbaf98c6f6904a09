//! Transaction and receipt records.

use alloy::primitives::{Address, B256, U256, U64};
use serde::{Deserialize, Serialize};

use super::{quantity, Log};

/// Transaction record combining the `eth_getTransactionByHash` view with receipt outcome
/// fields. Receipt-only fields stay at their defaults when decoded from a plain transaction.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transaction {
	pub block_hash: B256,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub block_number: u64,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub timestamp: u64,
	pub from: Address,
	#[serde(rename = "type")]
	pub transaction_type: U64,
	pub contract_address: Address,
	pub effective_gas_price: U256,
	pub bloom: String,
	/// 1 for success, 0 for failure
	#[serde(deserialize_with = "quantity::deserialize")]
	pub status: u64,
	/// Gas limit supplied by the sender
	pub gas: U64,
	pub gas_price: Option<U256>,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub gas_used: u64,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub cumulative_gas_used: u64,
	pub hash: B256,
	pub input: String,
	pub nonce: U64,
	/// Recipient, `None` for contract creation
	pub to: Option<Address>,
	pub transaction_index: U64,
	pub value: Option<U256>,
	pub v: Option<U256>,
	pub r: Option<U256>,
	pub s: Option<U256>,
	pub published_time: i64,
}

impl Transaction {
	pub fn is_contract_creation(&self) -> bool {
		self.to.is_none()
	}
}

/// Reply of `eth_getTransactionReceipt`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionReceipt {
	pub transaction_hash: B256,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub transaction_index: u64,
	pub block_hash: B256,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub block_number: u64,
	pub from: Address,
	pub to: Option<Address>,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub cumulative_gas_used: u64,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub gas_used: u64,
	pub effective_gas_price: Option<U256>,
	pub contract_address: Option<Address>,
	pub logs: Vec<Log>,
	pub logs_bloom: String,
	#[serde(deserialize_with = "quantity::deserialize")]
	pub status: u64,
	#[serde(rename = "type")]
	pub transaction_type: U64,
}

impl TransactionReceipt {
	pub fn succeeded(&self) -> bool {
		self.status == 1
	}
}
