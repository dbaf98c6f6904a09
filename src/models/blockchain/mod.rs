//! Chain data records.
//!
//! These are opaque payloads to the RPC layer: it decodes them into whichever type the
//! caller asks for and never interprets their fields.

mod account;
mod block;
mod internal_tx;
mod log;
pub mod quantity;
mod transaction;

pub use account::DirtyAccount;
pub use block::{Block, BlockResponse};
pub use internal_tx::InternalTransaction;
pub use log::Log;
pub use transaction::{Transaction, TransactionReceipt};
