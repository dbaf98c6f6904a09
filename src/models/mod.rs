//! Domain models and data structures for node auditing.
//!
//! - `blockchain`: Chain data records decoded from node replies
//! - `config`: Configuration loading and validation
//! - `security`: Security models (Secret)

mod blockchain;
mod config;
mod security;

// Re-export blockchain types
pub use blockchain::{
	quantity, Block, BlockResponse, DirtyAccount, InternalTransaction, Log, Transaction,
	TransactionReceipt,
};

// Re-export config types
pub use config::{AppConfig, ConfigError, NodeEndpoint};

// Re-export security types
pub use security::SecretString;
