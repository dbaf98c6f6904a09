//! Bootstrap module for wiring the audit service from configuration.
//!
//! # Services
//! - `JsonRpcClient`: one per configured node, each in its own tracing span
//! - `TelegramNotifier`: alert delivery with retries
//! - `AuditService`: the polling loop tying them together

use reqwest::Client;
use reqwest_retry::DefaultRetryableStrategy;
use std::{collections::HashMap, error::Error, sync::Arc, time::Duration};

use crate::{
	models::{AppConfig, NodeEndpoint},
	services::{
		audit::{AuditError, AuditService, AuditSettings, AuditedNode},
		notification::TelegramNotifier,
		rpc::{JsonRpcClient, RpcClientConfig},
	},
	utils::{create_retryable_http_client, RetryConfig},
};

/// Type alias for handling ServiceResult
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// The audit service as run by the binary
pub type NodeAuditService = AuditService<JsonRpcClient, TelegramNotifier>;

const NOTIFIER_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the RPC client for one node, bounded by `call_timeout`
pub fn create_node_client(
	endpoint: &NodeEndpoint,
	call_timeout: Duration,
) -> std::result::Result<JsonRpcClient, AuditError> {
	let config = RpcClientConfig::with_call_timeout(call_timeout);
	let client = JsonRpcClient::with_config(&endpoint.url, &config).map_err(|e| {
		AuditError::client_setup(
			format!("Failed to create RPC client for {}", endpoint.name),
			Some(e.into()),
			Some(HashMap::from([("node".to_string(), endpoint.name.clone())])),
		)
	})?;

	Ok(client.with_span(tracing::info_span!(
		"rpc_client",
		node = %endpoint.name,
		url = %endpoint.url
	)))
}

/// Builds the Telegram notifier over a retrying HTTP client
pub fn create_notifier(config: &AppConfig) -> std::result::Result<TelegramNotifier, AuditError> {
	let base_client = Client::builder()
		.timeout(NOTIFIER_TIMEOUT)
		.build()
		.map_err(|e| {
			AuditError::client_setup("Failed to create notifier HTTP client", Some(e.into()), None)
		})?;
	let http_client = create_retryable_http_client::<DefaultRetryableStrategy>(
		&RetryConfig::default(),
		base_client,
		None,
	);

	TelegramNotifier::new(config.telegram_bot_token.clone(), Arc::new(http_client)).map_err(
		|e| AuditError::client_setup("Failed to create Telegram notifier", Some(e.into()), None),
	)
}

/// Initializes the audit service from validated configuration.
///
/// # Errors
/// Returns an error if any client cannot be created
pub fn initialize_audit_service(
	config: &AppConfig,
) -> std::result::Result<NodeAuditService, AuditError> {
	let reference = AuditedNode::new(
		config.reference.name.clone(),
		create_node_client(&config.reference, config.rpc_timeout)?,
	);

	let audited = config
		.audited
		.iter()
		.map(|endpoint| {
			create_node_client(endpoint, config.rpc_timeout)
				.map(|client| AuditedNode::new(endpoint.name.clone(), client))
		})
		.collect::<std::result::Result<Vec<_>, _>>()?;

	let notifier = create_notifier(config)?;

	Ok(AuditService::new(
		reference,
		audited,
		Arc::new(notifier),
		AuditSettings::from(config),
	))
}
