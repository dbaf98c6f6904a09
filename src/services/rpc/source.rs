//! Chain-tip lookup used by the audit loop.

use async_trait::async_trait;

use super::{client::JsonRpcClient, error::RpcError};

/// Anything that can report the height of its latest block
#[async_trait]
pub trait BlockSource: Send + Sync {
	async fn latest_block_number(&self) -> Result<u64, RpcError>;
}

#[async_trait]
impl BlockSource for JsonRpcClient {
	async fn latest_block_number(&self) -> Result<u64, RpcError> {
		Ok(self.get_latest_block().await?.block_number())
	}
}
