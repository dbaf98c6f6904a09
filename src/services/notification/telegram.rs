//! Telegram alert delivery.
//!
//! Alerts are posted to the Bot API `sendMessage` endpoint as JSON. Every
//! message mentions `@here` and targets a group chat by its numeric id.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::json;
use std::{collections::HashMap, sync::Arc};

use crate::{models::SecretString, services::notification::NotificationError};

/// Public Bot API host
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Something that can deliver a text alert to a group chat
#[async_trait]
pub trait AlertSender: Send + Sync {
	/// Sends `message` to the group identified by `group_id`
	///
	/// # Arguments
	/// * `group_id` - Positive group id; the chat id sent on the wire is its negation
	/// * `message` - Plain alert text
	///
	/// # Returns
	/// * `Result<(), NotificationError>` - Success or error
	async fn send_alert(&self, group_id: u64, message: &str) -> Result<(), NotificationError>;
}

/// Builds `sendMessage` bodies.
#[derive(Debug, Clone, Default)]
pub struct TelegramPayloadBuilder {
	pub disable_web_preview: bool,
}

impl TelegramPayloadBuilder {
	/// Group chats are addressed by the negated group id.
	pub fn chat_id(group_id: u64) -> String {
		format!("-{}", group_id)
	}

	pub fn build_payload(&self, group_id: u64, message: &str) -> serde_json::Value {
		json!({
			"chat_id": Self::chat_id(group_id),
			"text": format!("@here {}", message),
			"disable_web_page_preview": self.disable_web_preview
		})
	}
}

/// Sends alerts through the Telegram Bot API
#[derive(Debug)]
pub struct TelegramNotifier {
	/// Bot token embedded in the request path
	token: SecretString,
	/// API host, replaced by a local mock in tests
	base_url: String,
	/// Configured HTTP client with retry capabilities
	client: Arc<ClientWithMiddleware>,
	payload_builder: TelegramPayloadBuilder,
}

impl TelegramNotifier {
	/// Creates a notifier talking to the public Bot API
	///
	/// # Arguments
	/// * `token` - Bot token
	/// * `http_client` - HTTP client with middleware for retries
	///
	/// # Returns
	/// * `Result<Self, NotificationError>` - Notifier instance if the token is usable
	pub fn new(
		token: SecretString,
		http_client: Arc<ClientWithMiddleware>,
	) -> Result<Self, NotificationError> {
		Self::with_base_url(token, TELEGRAM_API_URL, http_client)
	}

	/// Creates a notifier talking to `base_url` instead of the public API
	pub fn with_base_url(
		token: SecretString,
		base_url: impl Into<String>,
		http_client: Arc<ClientWithMiddleware>,
	) -> Result<Self, NotificationError> {
		if token.is_empty() {
			return Err(NotificationError::config_error(
				"Telegram bot token cannot be empty",
				None,
				None,
			));
		}

		Ok(Self {
			token,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			client: http_client,
			payload_builder: TelegramPayloadBuilder {
				disable_web_preview: true,
			},
		})
	}

	fn send_message_url(&self) -> String {
		format!("{}/bot{}/sendMessage", self.base_url, self.token.as_str())
	}

	/// Sends a JSON payload to the `sendMessage` endpoint
	///
	/// # Arguments
	/// * `payload` - The JSON payload to send
	///
	/// # Returns
	/// * `Result<(), NotificationError>` - Success or error
	pub async fn notify_json(&self, payload: &serde_json::Value) -> Result<(), NotificationError> {
		let metadata = payload
			.get("chat_id")
			.and_then(|id| id.as_str())
			.map(|id| HashMap::from([("chat_id".to_string(), id.to_string())]));

		let response = self
			.client
			.post(self.send_message_url())
			.json(payload)
			.send()
			.await
			.map_err(|e| {
				let e = strip_url(e);
				NotificationError::network_error(
					format!("Failed to send Telegram request: {}", e),
					Some(e.into()),
					metadata.clone(),
				)
			})?;

		let status = response.status();

		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			tracing::debug!(status = %status, body = %body, "Telegram rejected message");
			return Err(NotificationError::notify_failed(
				format!("Telegram request failed with status: {}", status),
				None,
				metadata,
			));
		}

		Ok(())
	}
}

/// The bot token is part of the request URL; keep it out of error text.
fn strip_url(error: reqwest_middleware::Error) -> reqwest_middleware::Error {
	match error {
		reqwest_middleware::Error::Reqwest(e) => reqwest_middleware::Error::Reqwest(e.without_url()),
		other => other,
	}
}

#[async_trait]
impl AlertSender for TelegramNotifier {
	#[tracing::instrument(skip(self, message))]
	async fn send_alert(&self, group_id: u64, message: &str) -> Result<(), NotificationError> {
		tracing::info!(message, "Sending alert");
		let payload = self.payload_builder.build_payload(group_id, message);
		self.notify_json(&payload).await
	}
}
