//! Test helper utilities
//!
//! - `builders`: Builders for chain records and canned JSON-RPC replies
//! - `http`: Test helper utilities for creating HTTP clients

pub mod builders {
	pub mod block;
	pub mod rpc;
}


pub use builders::*;
pub use http::*;
