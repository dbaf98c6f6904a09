//! JSON-RPC error taxonomy.
//!
//! [`ErrorObject`] is the wire-level `{code, message, data}` triple. [`ServerError`] and
//! [`BatchError`] turn error objects into Rust errors without losing their structure, and
//! [`RpcError`] is what every client call returns on failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, fmt};
use thiserror::Error;
use uuid::Uuid;

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};

/// Parse error: request body malformed
pub const PARSE_ERROR: i64 = -32700;
/// Invalid request: structurally wrong
pub const INVALID_REQUEST: i64 = -32600;
/// Method not found
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid parameters
pub const INVALID_PARAMS: i64 = -32602;
/// Internal error (generic catch-all)
pub const INTERNAL_ERROR: i64 = -32603;
/// Request exceeded the configured timeout
pub const REQUEST_TIMEOUT: i64 = -32608;
/// Generic server error
pub const SERVER_ERROR: i64 = -32000;
/// Tells an intermediary to retry the call against a different upstream
pub const FORWARD_NEEDED: i64 = -32001;

pub const TIMEOUT_MESSAGE: &str = "request exceeds timeout";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Error";

/// Structured JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
	pub code: i64,
	#[serde(default)]
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

impl ErrorObject {
	pub fn new(code: i64, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
			data: None,
		}
	}

	pub fn with_data(mut self, data: Value) -> Self {
		self.data = Some(data);
		self
	}

	/// Error synthesized locally when a deadline fires before the work completes
	pub fn timeout() -> Self {
		Self::new(REQUEST_TIMEOUT, TIMEOUT_MESSAGE)
	}

	pub fn internal() -> Self {
		Self::new(INTERNAL_ERROR, INTERNAL_ERROR_MESSAGE)
	}

	/// Error object asking a proxying layer to retry against another upstream
	pub fn forward() -> Self {
		Self::new(FORWARD_NEEDED, "")
	}

	pub fn need_forward(&self) -> bool {
		self.code == FORWARD_NEEDED
	}

	pub fn is_timeout(&self) -> bool {
		self.code == REQUEST_TIMEOUT
	}

	/// Converts the object into an error whose text is the object's compact JSON encoding.
	pub fn to_error(&self) -> ServerError {
		let text = serde_json::to_string(self)
			.unwrap_or_else(|e| format!("cannot marshal ErrorObject to json: {}", e));
		ServerError {
			object: self.clone(),
			text,
		}
	}
}

impl fmt::Display for ErrorObject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_error())
	}
}

/// An [`ErrorObject`] raised as an error.
///
/// Displays as the object's JSON text; the structured object stays reachable through
/// [`ServerError::object`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{text}")]
pub struct ServerError {
	object: ErrorObject,
	text: String,
}

impl ServerError {
	pub fn object(&self) -> &ErrorObject {
		&self.object
	}

	pub fn code(&self) -> i64 {
		self.object.code
	}

	pub fn into_object(self) -> ErrorObject {
		self.object
	}
}

impl From<ErrorObject> for ServerError {
	fn from(object: ErrorObject) -> Self {
		object.to_error()
	}
}

/// Every per-item error of a batch reply, in reply order.
///
/// Displays as each item's JSON text joined with `"; "`; each item can still be inspected
/// on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchError {
	errors: Vec<ServerError>,
}

impl BatchError {
	pub fn new(errors: Vec<ServerError>) -> Self {
		Self { errors }
	}

	pub fn errors(&self) -> &[ServerError] {
		&self.errors
	}

	pub fn objects(&self) -> impl Iterator<Item = &ErrorObject> {
		self.errors.iter().map(ServerError::object)
	}

	pub fn len(&self) -> usize {
		self.errors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}
}

impl fmt::Display for BatchError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
		write!(f, "{}", parts.join("; "))
	}
}

impl std::error::Error for BatchError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.errors
			.first()
			.map(|e| e as &(dyn std::error::Error + 'static))
	}
}

impl IntoIterator for BatchError {
	type Item = ServerError;
	type IntoIter = std::vec::IntoIter<ServerError>;

	fn into_iter(self) -> Self::IntoIter {
		self.errors.into_iter()
	}
}

/// Failure of a JSON-RPC call
#[derive(Debug, Error)]
pub enum RpcError {
	/// Connection or send failure reported by the HTTP client
	#[error("RPC client got errors: {0}")]
	Network(ErrorContext),

	/// The request body could not be encoded
	#[error("Failed to serialize request JSON: {0}")]
	RequestSerialization(ErrorContext),

	/// Any HTTP status other than 200
	#[error("RPC server returned status code: {}", status_code.as_u16())]
	Http {
		status_code: reqwest::StatusCode,
		url: String,
		body: String,
		context: ErrorContext,
	},

	/// The body could not be decoded into the expected type
	#[error("Failed to parse JSON-RPC response: {0}")]
	ResponseParse(ErrorContext),

	/// The reply carried a populated `error` field
	#[error(transparent)]
	Server(ServerError),

	/// At least one item of a batch reply carried an error
	#[error("RPC server returned error response; {0}")]
	Batch(BatchError),

	/// The call deadline elapsed before a reply arrived
	#[error(transparent)]
	Timeout(ServerError),

	/// The task running the call ended without reporting an outcome
	#[error(transparent)]
	Internal(ServerError),
}

impl RpcError {
	pub fn network(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::Network(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn request_serialization(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::RequestSerialization(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn http(
		status_code: reqwest::StatusCode,
		url: String,
		body: String,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let msg = format!("HTTP error: status {} for URL {}", status_code, url);
		Self::Http {
			status_code,
			url,
			body,
			context: ErrorContext::new_with_log(msg, source, metadata),
		}
	}

	pub fn response_parse(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ResponseParse(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn timeout() -> Self {
		Self::Timeout(ErrorObject::timeout().to_error())
	}

	/// Maps an error object synthesized locally by the timeout wrapper.
	///
	/// Never yields [`RpcError::Server`], which is reserved for replies from the node.
	pub fn local(object: ErrorObject) -> Self {
		if object.is_timeout() {
			Self::Timeout(object.to_error())
		} else {
			Self::Internal(object.to_error())
		}
	}

	/// The error object behind a protocol or timeout failure
	pub fn error_object(&self) -> Option<&ErrorObject> {
		match self {
			Self::Server(err) | Self::Timeout(err) | Self::Internal(err) => Some(err.object()),
			_ => None,
		}
	}

	/// True when the upstream asked for the call to be forwarded elsewhere
	pub fn need_forward(&self) -> bool {
		self.error_object().is_some_and(ErrorObject::need_forward)
	}

	/// Connection, serialization and non-200 failures
	pub fn is_transport(&self) -> bool {
		matches!(
			self,
			Self::Network(_) | Self::RequestSerialization(_) | Self::Http { .. }
		)
	}

	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout(_))
	}
}

impl TraceableError for RpcError {
	fn trace_id(&self) -> String {
		match self {
			Self::Network(ctx) => ctx.trace_id.clone(),
			Self::RequestSerialization(ctx) => ctx.trace_id.clone(),
			Self::Http { context, .. } => context.trace_id.clone(),
			Self::ResponseParse(ctx) => ctx.trace_id.clone(),
			Self::Server(_) | Self::Batch(_) | Self::Timeout(_) | Self::Internal(_) => {
				Uuid::new_v4().to_string()
			}
		}
	}
}

/// Joins an error and its source chain with `,`
pub fn squash_errors(err: &(dyn std::error::Error + 'static)) -> String {
	let mut parts = vec![err.to_string()];
	let mut source = err.source();
	while let Some(inner) = source {
		parts.push(inner.to_string());
		source = inner.source();
	}
	parts.join(",")
}
