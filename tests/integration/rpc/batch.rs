use alloy::primitives::B256;
use mockito::{Matcher, Server};
use node_audit::{
	services::rpc::{request, JsonRpcClient, Request, RpcError, METHOD_NOT_FOUND},
	utils::tests::rpc::{error_reply, success_reply},
};
use serde_json::{json, Value};

fn numbered_requests(count: u64) -> Vec<Request> {
	(1..=count)
		.map(|id| request::block_number().with_id(json!(id)))
		.collect()
}

#[tokio::test]
async fn test_batch_with_one_failed_item_reports_that_item() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(
			json!([
				success_reply(json!(1), json!("0x1")),
				error_reply(json!(2), METHOD_NOT_FOUND, "not found"),
				success_reply(json!(3), json!("0x3")),
			])
			.to_string(),
		)
		.create_async()
		.await;

	let client = JsonRpcClient::new(&server.url()).unwrap();
	let error = client
		.call_batch::<Value>(&numbered_requests(3))
		.await
		.unwrap_err();

	match &error {
		RpcError::Batch(batch) => {
			assert_eq!(batch.len(), 1);
			assert_eq!(batch.errors()[0].code(), METHOD_NOT_FOUND);
		}
		other => panic!("expected Batch error, got {other:?}"),
	}
	let text = error.to_string();
	assert!(text.starts_with("RPC server returned error response; "));
	assert!(text.contains("not found"));
	mock.assert();
}

#[tokio::test]
async fn test_batch_sends_one_array_and_keeps_request_order() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_body(Matcher::Json(json!([
			{ "jsonrpc": "2.0", "method": "eth_blockNumber", "params": [], "id": 1 },
			{ "jsonrpc": "2.0", "method": "eth_blockNumber", "params": [], "id": 2 },
			{ "jsonrpc": "2.0", "method": "eth_blockNumber", "params": [], "id": 3 }
		])))
		.with_status(200)
		// Replies arrive out of order
		.with_body(
			json!([
				success_reply(json!(3), json!("0x3")),
				success_reply(json!(1), json!("0x1")),
				success_reply(json!(2), json!("0x2")),
			])
			.to_string(),
		)
		.create_async()
		.await;

	let client = JsonRpcClient::new(&server.url()).unwrap();
	let batch = client
		.call_batch::<String>(&numbered_requests(3))
		.await
		.unwrap();

	assert_eq!(batch.len(), 3);
	assert_eq!(
		batch.result(),
		vec![
			Some("0x1".to_string()),
			Some("0x2".to_string()),
			Some("0x3".to_string())
		]
	);
	assert!(batch.errors().is_empty());
	assert!(batch.to_error().is_none());
	mock.assert();
}

#[tokio::test]
async fn test_batch_without_usable_ids_keeps_server_order() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(r#"[{"jsonrpc":"2.0","result":"b"},{"jsonrpc":"2.0","result":"a"}]"#)
		.create_async()
		.await;

	let client = JsonRpcClient::new(&server.url()).unwrap();
	let batch = client
		.call_batch::<String>(&numbered_requests(2))
		.await
		.unwrap();

	assert_eq!(
		batch.result(),
		vec![Some("b".to_string()), Some("a".to_string())]
	);
	mock.assert();
}

#[tokio::test]
async fn test_get_transactions_maps_unknown_hashes_to_none() {
	let known = B256::repeat_byte(0x11);
	let unknown = B256::repeat_byte(0x22);

	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body_from_request(move |request| {
			let body: Value = serde_json::from_slice(request.body().unwrap()).unwrap();
			let replies: Vec<Value> = body
				.as_array()
				.unwrap()
				.iter()
				.map(|item| {
					let result = if item["params"][0] == json!(known.to_string()) {
						json!({ "hash": known.to_string(), "nonce": "0x5", "value": "0x0" })
					} else {
						Value::Null
					};
					success_reply(item["id"].clone(), result)
				})
				.collect();
			Value::from(replies).to_string().into_bytes()
		})
		.create_async()
		.await;

	let client = JsonRpcClient::new(&server.url()).unwrap();
	let transactions = client.get_transactions(&[known, unknown]).await.unwrap();

	assert_eq!(transactions.len(), 2);
	assert_eq!(transactions[0].as_ref().map(|tx| tx.hash), Some(known));
	assert!(transactions[1].is_none());
	mock.assert();
}

#[tokio::test]
async fn test_batch_http_failure_is_transport_error() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(502)
		.create_async()
		.await;

	let client = JsonRpcClient::new(&server.url()).unwrap();
	let error = client
		.call_batch::<Value>(&numbered_requests(2))
		.await
		.unwrap_err();

	assert!(error.is_transport());
	mock.assert();
}

#[tokio::test]
async fn test_batch_reply_that_is_not_an_array_is_parse_error() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(error_reply(Value::Null, -32600, "invalid request").to_string())
		.create_async()
		.await;

	let client = JsonRpcClient::new(&server.url()).unwrap();
	let error = client
		.call_batch::<Value>(&numbered_requests(2))
		.await
		.unwrap_err();

	assert!(matches!(error, RpcError::ResponseParse(_)));
	mock.assert();
}
