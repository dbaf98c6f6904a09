//! Request builders for the node methods the auditor talks to.
//!
//! Every builder returns a [`Request`] with a fresh id and positional array params.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;

use super::message::Request;

pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const ETH_BLOCK_NUMBER: &str = "eth_blockNumber";
pub const ETH_GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";
pub const ETH_GET_BLOCK_BY_HASH: &str = "eth_getBlockByHash";
pub const ETH_GET_TRANSACTION_BY_HASH: &str = "eth_getTransactionByHash";
pub const ETH_GET_TRANSACTION_BY_BLOCK_HASH_AND_INDEX: &str =
	"eth_getTransactionByBlockHashAndIndex";
pub const ETH_GET_TRANSACTION_BY_BLOCK_NUMBER_AND_INDEX: &str =
	"eth_getTransactionByBlockNumberAndIndex";
pub const ETH_GET_BLOCK_TRANSACTION_COUNT_BY_HASH: &str = "eth_getBlockTransactionCountByHash";
pub const ETH_GET_BLOCK_TRANSACTION_COUNT_BY_NUMBER: &str =
	"eth_getBlockTransactionCountByNumber";
pub const ETH_GET_TRANSACTION_COUNT: &str = "eth_getTransactionCount";
pub const ETH_GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
pub const ETH_GET_LOGS: &str = "eth_getLogs";
pub const DEBUG_TRACE_INTERNALS_AND_ACCOUNTS_BY_BLOCK_HASH: &str =
	"debug_traceInternalsAndAccountsByBlockHash";

/// Tracer requested from `debug_traceInternalsAndAccountsByBlockHash`
pub const INTERNALS_TRACER: &str = "callTracer2";

/// Block selector accepted by the `eth_*` methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTag {
	Latest,
	Earliest,
	Pending,
	Number(u64),
}

impl fmt::Display for BlockTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Latest => write!(f, "latest"),
			Self::Earliest => write!(f, "earliest"),
			Self::Pending => write!(f, "pending"),
			Self::Number(n) => write!(f, "0x{:x}", n),
		}
	}
}

impl Serialize for BlockTag {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl From<u64> for BlockTag {
	fn from(number: u64) -> Self {
		Self::Number(number)
	}
}

fn hex_quantity(value: u64) -> String {
	format!("0x{:x}", value)
}

pub fn chain_id() -> Request {
	Request::new(ETH_CHAIN_ID, Some(json!([])))
}

pub fn block_number() -> Request {
	Request::new(ETH_BLOCK_NUMBER, Some(json!([])))
}

/// `full_transactions` selects full transaction objects over hashes
pub fn block_by_number(tag: BlockTag, full_transactions: bool) -> Request {
	Request::new(ETH_GET_BLOCK_BY_NUMBER, Some(json!([tag, full_transactions])))
}

pub fn block_by_hash(hash: &str, full_transactions: bool) -> Request {
	Request::new(ETH_GET_BLOCK_BY_HASH, Some(json!([hash, full_transactions])))
}

pub fn balance(address: &str, tag: BlockTag) -> Request {
	Request::new(ETH_GET_BALANCE, Some(json!([address, tag])))
}

pub fn transaction_by_hash(hash: &str) -> Request {
	Request::new(ETH_GET_TRANSACTION_BY_HASH, Some(json!([hash])))
}

pub fn transaction_by_block_hash_and_index(block_hash: &str, index: u64) -> Request {
	Request::new(
		ETH_GET_TRANSACTION_BY_BLOCK_HASH_AND_INDEX,
		Some(json!([block_hash, hex_quantity(index)])),
	)
}

pub fn transaction_by_block_number_and_index(tag: BlockTag, index: u64) -> Request {
	Request::new(
		ETH_GET_TRANSACTION_BY_BLOCK_NUMBER_AND_INDEX,
		Some(json!([tag, hex_quantity(index)])),
	)
}

pub fn block_transaction_count_by_hash(block_hash: &str) -> Request {
	Request::new(
		ETH_GET_BLOCK_TRANSACTION_COUNT_BY_HASH,
		Some(json!([block_hash])),
	)
}

pub fn block_transaction_count_by_number(tag: BlockTag) -> Request {
	Request::new(ETH_GET_BLOCK_TRANSACTION_COUNT_BY_NUMBER, Some(json!([tag])))
}

pub fn transaction_count(address: &str, tag: BlockTag) -> Request {
	Request::new(ETH_GET_TRANSACTION_COUNT, Some(json!([address, tag])))
}

pub fn transaction_receipt(hash: &str) -> Request {
	Request::new(ETH_GET_TRANSACTION_RECEIPT, Some(json!([hash])))
}

/// Logs of a single block
pub fn logs_by_block_hash(block_hash: &str) -> Request {
	Request::new(ETH_GET_LOGS, Some(json!([{ "blockHash": block_hash }])))
}

/// Logs of an inclusive block range, optionally restricted to some emitters
pub fn logs_by_range(from: BlockTag, to: BlockTag, addresses: Option<Vec<String>>) -> Request {
	let mut filter = json!({ "fromBlock": from, "toBlock": to });
	if let Some(addresses) = addresses {
		filter["address"] = Value::from(addresses);
	}
	Request::new(ETH_GET_LOGS, Some(json!([filter])))
}

pub fn trace_internals_and_accounts(block_hash: &str) -> Request {
	Request::new(
		DEBUG_TRACE_INTERNALS_AND_ACCOUNTS_BY_BLOCK_HASH,
		Some(json!([block_hash, { "tracer": INTERNALS_TRACER }])),
	)
}
