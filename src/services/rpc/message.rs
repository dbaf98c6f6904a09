//! JSON-RPC 2.0 message envelopes.
//!
//! [`Request`] and [`Response`] map one-to-one onto the wire objects. [`BatchResponse`]
//! wraps the array reply of a batch call and correlates each item's result and error.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use super::error::{BatchError, ErrorObject, INVALID_REQUEST, PARSE_ERROR};

/// Protocol version carried by every message
pub const JSONRPC_VERSION: &str = "2.0";

fn default_version() -> String {
	JSONRPC_VERSION.to_string()
}

/// A single JSON-RPC request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
	#[serde(default = "default_version")]
	pub jsonrpc: String,
	pub method: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub params: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<Value>,
}

impl Request {
	/// Builds a request carrying a fresh random id
	pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
		Self {
			jsonrpc: default_version(),
			method: method.into(),
			params,
			id: Some(Value::String(Uuid::new_v4().to_string())),
		}
	}

	/// Builds a request without an id; servers send no reply for these
	pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
		Self {
			id: None,
			..Self::new(method, params)
		}
	}

	pub fn with_id(mut self, id: Value) -> Self {
		self.id = Some(id);
		self
	}

	pub fn is_supported_version(&self) -> bool {
		self.jsonrpc == JSONRPC_VERSION
	}

	pub fn is_notification(&self) -> bool {
		self.id.is_none()
	}
}

/// A single JSON-RPC reply.
///
/// Decoding does not enforce that exactly one of `result` and `error` is present. Callers
/// check `error` first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
	#[serde(default = "default_version")]
	pub jsonrpc: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<Value>,
	#[serde(
		default = "Option::default",
		skip_serializing_if = "Option::is_none",
		bound(deserialize = "T: Deserialize<'de>")
	)]
	pub result: Option<T>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorObject>,
}

impl<T> Response<T> {
	pub fn success(id: Option<Value>, result: T) -> Self {
		Self {
			jsonrpc: default_version(),
			id,
			result: Some(result),
			error: None,
		}
	}

	pub fn failure(id: Option<Value>, error: ErrorObject) -> Self {
		Self {
			jsonrpc: default_version(),
			id,
			result: None,
			error: Some(error),
		}
	}

	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}
}

impl<T: DeserializeOwned> Response<T> {
	pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
		serde_json::from_slice(bytes)
	}
}

/// Canned error replies for a process that answers JSON-RPC on behalf of an upstream
impl Response<Value> {
	/// The body could not be decoded at all, so no id is known
	pub fn parse_error(detail: impl std::fmt::Display) -> Self {
		Self::failure(
			None,
			ErrorObject::new(
				PARSE_ERROR,
				format!("cannot parse the body, please review again: {}", detail),
			),
		)
	}

	pub fn unsupported_version(id: Option<Value>) -> Self {
		Self::failure(
			id,
			ErrorObject::new(INVALID_REQUEST, "supported only version: 2.0"),
		)
	}

	pub fn invalid_request(id: Option<Value>, detail: impl std::fmt::Display) -> Self {
		Self::failure(
			id,
			ErrorObject::new(INVALID_REQUEST, format!("invalid request: {}", detail)),
		)
	}

	pub fn internal_error(id: Option<Value>) -> Self {
		Self::failure(id, ErrorObject::internal())
	}
}

/// The ordered replies of a batch call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResponse<T> {
	#[serde(bound(deserialize = "T: Deserialize<'de>"))]
	items: Vec<Response<T>>,
}

impl<T> BatchResponse<T> {
	pub fn new(items: Vec<Response<T>>) -> Self {
		Self { items }
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Response<T>> {
		self.items.iter()
	}

	pub fn into_inner(self) -> Vec<Response<T>> {
		self.items
	}

	/// Every populated per-item error, in reply order
	pub fn errors(&self) -> Vec<ErrorObject> {
		self.items.iter().filter_map(|r| r.error.clone()).collect()
	}

	/// One error aggregating every per-item error, or `None` when no item failed
	pub fn to_error(&self) -> Option<BatchError> {
		let errors: Vec<_> = self
			.items
			.iter()
			.filter_map(|r| r.error.as_ref().map(ErrorObject::to_error))
			.collect();

		if errors.is_empty() {
			None
		} else {
			Some(BatchError::new(errors))
		}
	}

	/// Puts replies into the order of `requests`.
	///
	/// Only applies when the reply count matches and every reply id matches exactly one
	/// request id. Otherwise the server's order is kept.
	pub fn reorder_by_id(&mut self, requests: &[Request]) {
		if requests.len() != self.items.len() {
			return;
		}

		let mut positions: HashMap<String, usize> = HashMap::with_capacity(requests.len());
		for (index, request) in requests.iter().enumerate() {
			let Some(id) = request.id.as_ref() else {
				return;
			};
			if positions.insert(id.to_string(), index).is_some() {
				return;
			}
		}

		let mut targets = Vec::with_capacity(self.items.len());
		let mut seen = vec![false; requests.len()];
		for item in &self.items {
			let Some(&index) = item.id.as_ref().and_then(|id| positions.get(&id.to_string()))
			else {
				return;
			};
			if seen[index] {
				return;
			}
			seen[index] = true;
			targets.push(index);
		}

		let mut slots: Vec<Option<Response<T>>> = (0..self.items.len()).map(|_| None).collect();
		for (item, index) in std::mem::take(&mut self.items).into_iter().zip(targets) {
			slots[index] = Some(item);
		}
		self.items = slots.into_iter().flatten().collect();
	}
}

impl<T: Clone> BatchResponse<T> {
	/// Each item's result in order, `None` where the item carried none
	pub fn result(&self) -> Vec<Option<T>> {
		self.items.iter().map(|r| r.result.clone()).collect()
	}
}

impl<T> IntoIterator for BatchResponse<T> {
	type Item = Response<T>;
	type IntoIter = std::vec::IntoIter<Response<T>>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.into_iter()
	}
}

impl<T> From<Vec<Response<T>>> for BatchResponse<T> {
	fn from(items: Vec<Response<T>>) -> Self {
		Self::new(items)
	}
}
