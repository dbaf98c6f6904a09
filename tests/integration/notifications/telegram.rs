use mockito::{Matcher, Server};
use node_audit::{
	models::SecretString,
	services::notification::{AlertSender, NotificationError, TelegramNotifier},
	utils::tests::create_fast_retry_http_client,
};
use serde_json::json;
use std::sync::Arc;

const TOKEN: &str = "123456:secret-token";
const SEND_PATH: &str = "/bot123456:secret-token/sendMessage";

fn notifier(base_url: &str, retries: u32) -> Arc<dyn AlertSender> {
	Arc::new(
		TelegramNotifier::with_base_url(
			SecretString::new(TOKEN.to_string()),
			base_url,
			create_fast_retry_http_client(retries),
		)
		.unwrap(),
	)
}

#[tokio::test]
async fn test_alert_through_trait_object() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", SEND_PATH)
		.match_header("content-type", "application/json")
		.match_body(Matcher::Json(json!({
			"chat_id": "-4282374336",
			"text": "@here Eternity node block 90, Skymavis block 100, is delayed: 10 blocks",
			"disable_web_page_preview": true
		})))
		.with_status(200)
		.with_body(r#"{"ok":true,"result":{}}"#)
		.expect(1)
		.create_async()
		.await;

	let sender = notifier(&server.url(), 0);
	let result = sender
		.send_alert(
			4282374336,
			"Eternity node block 90, Skymavis block 100, is delayed: 10 blocks",
		)
		.await;

	assert!(result.is_ok());
	mock.assert();
}

#[tokio::test]
async fn test_server_errors_are_retried() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", SEND_PATH)
		.with_status(500)
		.expect(3)
		.create_async()
		.await;

	let sender = notifier(&server.url(), 2);
	let error = sender.send_alert(947505775, "hello").await.unwrap_err();

	assert!(matches!(error, NotificationError::NotifyFailed(_)));
	assert!(error.to_string().contains("500"));
	mock.assert();
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", SEND_PATH)
		.with_status(400)
		.with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
		.expect(1)
		.create_async()
		.await;

	let sender = notifier(&server.url(), 2);
	let error = sender.send_alert(1, "hello").await.unwrap_err();

	assert!(matches!(error, NotificationError::NotifyFailed(_)));
	assert!(error.to_string().contains("400"));
	mock.assert();
}

#[tokio::test]
async fn test_recovers_after_transient_failure() {
	let mut server = Server::new_async().await;
	let failing = server
		.mock("POST", SEND_PATH)
		.with_status(503)
		.expect(1)
		.create_async()
		.await;
	let succeeding = server
		.mock("POST", SEND_PATH)
		.with_status(200)
		.with_body(r#"{"ok":true}"#)
		.expect(1)
		.create_async()
		.await;

	let sender = notifier(&server.url(), 1);
	assert!(sender.send_alert(1, "hello").await.is_ok());

	failing.assert();
	succeeding.assert();
}

#[tokio::test]
async fn test_network_error_hides_token() {
	// Nothing listens on the discard port.
	let notifier = TelegramNotifier::with_base_url(
		SecretString::new(TOKEN.to_string()),
		"http://127.0.0.1:9",
		create_fast_retry_http_client(0),
	)
	.unwrap();

	let error = notifier.send_alert(1, "hello").await.unwrap_err();

	assert!(matches!(error, NotificationError::NetworkError(_)));
	assert!(!error.to_string().contains("secret-token"));
	assert!(!format!("{:?}", error).contains("secret-token"));
}
