//! JSON-RPC 2.0 client and message layer.
//!
//! - `message`: request/response envelopes and batch correlation
//! - `error`: error codes, error objects and the client error type
//! - `timeout`: deadline-bound execution of background work
//! - `deadline`: request-scoped deadlines for the HTTP status server
//! - `request`: request builders for the supported node methods
//! - `client`: the HTTP client
//! - `source`: chain-tip lookup trait

mod client;
mod deadline;
mod error;
mod message;
pub mod request;
mod source;
mod timeout;

pub use client::{
	JsonRpcClient, RpcClientConfig, DEFAULT_CALL_TIMEOUT, DEFAULT_CONNECT_TIMEOUT,
	DEFAULT_TRANSPORT_TIMEOUT, TRANSPORT_TIMEOUT_MARGIN,
};
pub use deadline::{HandlingTimeout, HandlingTimeoutMiddleware, RequestDeadline};
pub use error::{
	squash_errors, BatchError, ErrorObject, RpcError, ServerError, FORWARD_NEEDED,
	INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
	REQUEST_TIMEOUT, SERVER_ERROR,
};
pub use message::{BatchResponse, Request, Response, JSONRPC_VERSION};
pub use request::BlockTag;
pub use source::BlockSource;
pub use timeout::{with_deadline, with_timeout};
