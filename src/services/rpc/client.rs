//! JSON-RPC client for chain nodes.
//!
//! Every call is POSTed from a spawned task raced against the client's call timeout (see
//! [`with_timeout`]). The HTTP client's own transport timeout bounds that task, so a call
//! abandoned at its deadline still releases its connection once the transport gives up.

use alloy::primitives::{Address, B256, U256, U64};
use anyhow::Context;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{collections::HashMap, time::Duration};
use tracing::instrument;
use url::Url;

use super::{
	error::{squash_errors, ErrorObject, RpcError},
	message::{BatchResponse, Request, Response},
	request::{self, BlockTag},
	timeout::with_timeout,
};
use crate::models::{BlockResponse, Log, Transaction, TransactionReceipt};

/// Deadline applied to every call unless configured otherwise
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TRANSPORT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);
/// Minimum gap between a call deadline and the transport timeout behind it
pub const TRANSPORT_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Timeouts of a [`JsonRpcClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcClientConfig {
	/// Deadline the caller waits for a reply
	pub call_timeout: Duration,
	/// Upper bound of the underlying HTTP exchange, including abandoned ones
	pub transport_timeout: Duration,
	pub connect_timeout: Duration,
}

impl Default for RpcClientConfig {
	fn default() -> Self {
		Self {
			call_timeout: DEFAULT_CALL_TIMEOUT,
			transport_timeout: DEFAULT_TRANSPORT_TIMEOUT,
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
		}
	}
}

impl RpcClientConfig {
	/// Uses `call_timeout` as the call deadline.
	///
	/// The transport timeout is raised past the deadline when needed so the HTTP client
	/// never gives up on a call before its caller does.
	pub fn with_call_timeout(call_timeout: Duration) -> Self {
		Self {
			call_timeout,
			transport_timeout: DEFAULT_TRANSPORT_TIMEOUT
				.max(call_timeout.saturating_add(TRANSPORT_TIMEOUT_MARGIN)),
			..Self::default()
		}
	}
}

/// Client bound to one JSON-RPC endpoint.
///
/// Immutable after construction; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
	client: reqwest::Client,
	url: String,
	call_timeout: Duration,
	span: tracing::Span,
}

impl JsonRpcClient {
	/// Creates a client with the default timeouts
	pub fn new(url: &str) -> Result<Self, anyhow::Error> {
		Self::with_config(url, &RpcClientConfig::default())
	}

	pub fn with_config(url: &str, config: &RpcClientConfig) -> Result<Self, anyhow::Error> {
		Url::parse(url).with_context(|| format!("Invalid JSON-RPC URL: {}", url))?;

		let client = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(32)
			.timeout(
				config
					.transport_timeout
					.max(config.call_timeout.saturating_add(TRANSPORT_TIMEOUT_MARGIN)),
			)
			.connect_timeout(config.connect_timeout)
			.build()
			.context("Failed to create base HTTP client")?;

		Ok(Self::new_with_client(client, url, config.call_timeout))
	}

	/// Creates a client around an existing HTTP client
	pub fn new_with_client(
		client: reqwest::Client,
		url: impl Into<String>,
		call_timeout: Duration,
	) -> Self {
		let url = url.into();
		let span = tracing::info_span!("rpc_client", url = %url);
		Self {
			client,
			url,
			call_timeout,
			span,
		}
	}

	/// Replaces the span every call of this client is recorded under
	pub fn with_span(mut self, span: tracing::Span) -> Self {
		self.span = span;
		self
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn call_timeout(&self) -> Duration {
		self.call_timeout
	}

	/// Calls `method` with a fresh request id and decodes the result as `R`.
	///
	/// A reply without a result is accepted only when `R` decodes from `null`
	/// (`Option<_>`, `Value`, `()`).
	pub async fn call<R>(&self, method: &str, params: Option<Value>) -> Result<R, RpcError>
	where
		R: DeserializeOwned,
	{
		self.send(&Request::new(method, params)).await
	}

	pub async fn send<R>(&self, request: &Request) -> Result<R, RpcError>
	where
		R: DeserializeOwned,
	{
		self.send_to(&self.url, request).await
	}

	/// Sends `request` to `url` instead of the client's own endpoint
	#[instrument(parent = &self.span, skip_all, fields(method = %request.method, url = %url))]
	pub async fn send_to<R>(&self, url: &str, request: &Request) -> Result<R, RpcError>
	where
		R: DeserializeOwned,
	{
		let body = self.post(url, request).await?;

		let response: Response<R> = Response::from_slice(&body).map_err(|e| {
			RpcError::response_parse(
				format!("Failed to decode {} response", request.method),
				Some(Box::new(e)),
				Some(call_metadata(url, &request.method)),
			)
		})?;

		if let Some(error) = response.error {
			tracing::debug!(code = error.code, message = %error.message, "JSON-RPC error reply");
			return Err(RpcError::Server(error.to_error()));
		}

		match response.result {
			Some(result) => Ok(result),
			None => serde_json::from_value(Value::Null).map_err(|e| {
				RpcError::response_parse(
					format!("Missing result in {} response", request.method),
					Some(Box::new(e)),
					Some(call_metadata(url, &request.method)),
				)
			}),
		}
	}

	/// Sends every request as one JSON array.
	///
	/// Replies are put back into request order when their ids allow it. Any per-item error
	/// fails the whole call with [`RpcError::Batch`].
	#[instrument(parent = &self.span, skip_all, fields(size = requests.len()))]
	pub async fn call_batch<R>(&self, requests: &[Request]) -> Result<BatchResponse<R>, RpcError>
	where
		R: DeserializeOwned,
	{
		if requests.is_empty() {
			return Ok(BatchResponse::new(Vec::new()));
		}

		let body = self.post(&self.url, requests).await?;

		let mut batch: BatchResponse<R> = serde_json::from_slice(&body).map_err(|e| {
			RpcError::response_parse(
				"Failed to decode batch response",
				Some(Box::new(e)),
				Some(call_metadata(&self.url, "batch")),
			)
		})?;
		batch.reorder_by_id(requests);

		if let Some(errors) = batch.to_error() {
			tracing::debug!(failed = errors.len(), "JSON-RPC batch carried error replies");
			return Err(RpcError::Batch(errors));
		}
		Ok(batch)
	}

	/// Posts `request` and hands back the raw status and body, whatever they are
	#[instrument(parent = &self.span, skip_all, fields(method = %request.method))]
	pub async fn forward(&self, request: &Request) -> Result<(StatusCode, Bytes), RpcError> {
		self.execute(&self.url, request).await
	}

	pub async fn get_latest_block(&self) -> Result<BlockResponse, RpcError> {
		self.send(&request::block_by_number(BlockTag::Latest, false))
			.await
	}

	pub async fn chain_id(&self) -> Result<u64, RpcError> {
		let id: U64 = self.send(&request::chain_id()).await?;
		Ok(id.to::<u64>())
	}

	pub async fn block_number(&self) -> Result<u64, RpcError> {
		let number: U64 = self.send(&request::block_number()).await?;
		Ok(number.to::<u64>())
	}

	/// `None` when the node does not know the block
	pub async fn get_block_by_number(
		&self,
		tag: BlockTag,
	) -> Result<Option<BlockResponse>, RpcError> {
		self.send(&request::block_by_number(tag, false)).await
	}

	pub async fn get_block_by_hash(&self, hash: B256) -> Result<Option<BlockResponse>, RpcError> {
		self.send(&request::block_by_hash(&hash.to_string(), false))
			.await
	}

	pub async fn get_block_transaction_count_by_hash(&self, hash: B256) -> Result<u64, RpcError> {
		let count: U64 = self
			.send(&request::block_transaction_count_by_hash(&hash.to_string()))
			.await?;
		Ok(count.to::<u64>())
	}

	pub async fn get_block_transaction_count_by_number(
		&self,
		tag: BlockTag,
	) -> Result<u64, RpcError> {
		let count: U64 = self
			.send(&request::block_transaction_count_by_number(tag))
			.await?;
		Ok(count.to::<u64>())
	}

	pub async fn get_balance(&self, address: Address, tag: BlockTag) -> Result<U256, RpcError> {
		self.send(&request::balance(&address.to_string(), tag))
			.await
	}

	pub async fn get_transaction_count(
		&self,
		address: Address,
		tag: BlockTag,
	) -> Result<u64, RpcError> {
		let count: U64 = self
			.send(&request::transaction_count(&address.to_string(), tag))
			.await?;
		Ok(count.to::<u64>())
	}

	pub async fn get_transaction(&self, hash: B256) -> Result<Option<Transaction>, RpcError> {
		self.send(&request::transaction_by_hash(&hash.to_string()))
			.await
	}

	pub async fn get_transaction_by_block_hash_and_index(
		&self,
		block_hash: B256,
		index: u64,
	) -> Result<Option<Transaction>, RpcError> {
		self.send(&request::transaction_by_block_hash_and_index(
			&block_hash.to_string(),
			index,
		))
		.await
	}

	pub async fn get_transaction_by_block_number_and_index(
		&self,
		tag: BlockTag,
		index: u64,
	) -> Result<Option<Transaction>, RpcError> {
		self.send(&request::transaction_by_block_number_and_index(tag, index))
			.await
	}

	/// Fetches several transactions in one batch; unknown hashes come back as `None`
	pub async fn get_transactions(
		&self,
		hashes: &[B256],
	) -> Result<Vec<Option<Transaction>>, RpcError> {
		let requests: Vec<Request> = hashes
			.iter()
			.map(|hash| request::transaction_by_hash(&hash.to_string()))
			.collect();
		let batch = self.call_batch::<Transaction>(&requests).await?;
		Ok(batch.result())
	}

	pub async fn get_transaction_receipt(
		&self,
		hash: B256,
	) -> Result<Option<TransactionReceipt>, RpcError> {
		self.send(&request::transaction_receipt(&hash.to_string()))
			.await
	}

	pub async fn get_logs_by_block_hash(&self, block_hash: B256) -> Result<Vec<Log>, RpcError> {
		self.send(&request::logs_by_block_hash(&block_hash.to_string()))
			.await
	}

	pub async fn get_logs(
		&self,
		from: BlockTag,
		to: BlockTag,
		addresses: Option<Vec<Address>>,
	) -> Result<Vec<Log>, RpcError> {
		let addresses =
			addresses.map(|list| list.iter().map(ToString::to_string).collect::<Vec<_>>());
		self.send(&request::logs_by_range(from, to, addresses))
			.await
	}

	/// Internal transactions and dirty accounts of a block, decoded as `R`
	pub async fn trace_internals_and_accounts<R>(&self, block_hash: B256) -> Result<R, RpcError>
	where
		R: DeserializeOwned,
	{
		self.send(&request::trace_internals_and_accounts(
			&block_hash.to_string(),
		))
		.await
	}

	/// POSTs `body` and insists on HTTP 200
	async fn post<B>(&self, url: &str, body: &B) -> Result<Bytes, RpcError>
	where
		B: Serialize + ?Sized,
	{
		let (status, bytes) = self.execute(url, body).await?;
		if status != StatusCode::OK {
			tracing::warn!(status = %status, url = %url, "JSON-RPC request failed with HTTP status");
			return Err(RpcError::http(
				status,
				url.to_string(),
				String::from_utf8_lossy(&bytes).into_owned(),
				None,
				None,
			));
		}
		Ok(bytes)
	}

	async fn execute<B>(&self, url: &str, body: &B) -> Result<(StatusCode, Bytes), RpcError>
	where
		B: Serialize + ?Sized,
	{
		let payload = serde_json::to_vec(body).map_err(|e| {
			RpcError::request_serialization(
				"Failed to serialize request JSON",
				Some(Box::new(e)),
				Some(url_metadata(url)),
			)
		})?;

		let client = self.client.clone();
		let target = url.to_string();
		let work = async move {
			let outcome = send_payload(&client, &target, payload).await;
			Ok::<_, ErrorObject>(outcome)
		};

		match with_timeout(self.call_timeout, work).await {
			Ok(outcome) => outcome,
			Err(object) => {
				if object.is_timeout() {
					tracing::warn!(
						url = %url,
						timeout = ?self.call_timeout,
						"JSON-RPC call exceeded its deadline"
					);
				}
				Err(RpcError::local(object))
			}
		}
	}
}

async fn send_payload(
	client: &reqwest::Client,
	url: &str,
	payload: Vec<u8>,
) -> Result<(StatusCode, Bytes), RpcError> {
	let response = client
		.post(url)
		.header(CONTENT_TYPE, "application/json")
		.body(payload)
		.send()
		.await
		.map_err(|e| network_error(url, e))?;

	let status = response.status();
	let body = response.bytes().await.map_err(|e| network_error(url, e))?;
	Ok((status, body))
}

fn network_error(url: &str, error: reqwest::Error) -> RpcError {
	let message = squash_errors(&error);
	RpcError::network(message, Some(Box::new(error)), Some(url_metadata(url)))
}

fn url_metadata(url: &str) -> HashMap<String, String> {
	HashMap::from([("url".to_string(), url.to_string())])
}

fn call_metadata(url: &str, method: &str) -> HashMap<String, String> {
	HashMap::from([
		("url".to_string(), url.to_string()),
		("method".to_string(), method.to_string()),
	])
}
