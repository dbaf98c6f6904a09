use alloy::primitives::{Address, B256, U256, U64};
use mockito::{Matcher, Server};
use node_audit::{
	services::rpc::{
		request::{self, BlockTag},
		JsonRpcClient, Request, RpcError, FORWARD_NEEDED, METHOD_NOT_FOUND, REQUEST_TIMEOUT,
	},
	utils::tests::{
		block::BlockBuilder,
		rpc::{error_reply, latest_block_reply, success_reply},
	},
};
use serde_json::{json, Value};
use std::{
	collections::HashSet,
	sync::{Arc, Mutex},
	time::Duration,
};

fn create_client(url: &str) -> JsonRpcClient {
	JsonRpcClient::new(url).unwrap()
}

/// Mock answering `method` called with exactly `params`
async fn expect_call(
	server: &mut Server,
	method: &str,
	params: Value,
	result: Value,
) -> mockito::Mock {
	server
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({
			"jsonrpc": "2.0",
			"method": method,
			"params": params
		})))
		.with_status(200)
		.with_body(success_reply(json!("x"), result).to_string())
		.expect(1)
		.create_async()
		.await
}

fn hash_hex(byte: u8) -> String {
	format!("0x{}", format!("{:02x}", byte).repeat(32))
}

#[tokio::test]
async fn test_get_latest_block_decodes_block_number() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_header("content-type", "application/json")
		.match_body(Matcher::PartialJson(json!({
			"jsonrpc": "2.0",
			"method": "eth_getBlockByNumber",
			"params": ["latest", false]
		})))
		.with_status(200)
		.with_body(latest_block_reply(16))
		.create_async()
		.await;

	let client = create_client(&server.url());
	let block = client.get_latest_block().await.unwrap();

	assert_eq!(block.block_number(), 16);
	mock.assert();
}

#[tokio::test]
async fn test_full_block_header_decodes() {
	let hash = B256::repeat_byte(0xab);
	let reply = success_reply(
		json!(1),
		BlockBuilder::new()
			.number(44_000_000)
			.hash(hash)
			.timestamp(1_710_000_000)
			.transaction(B256::repeat_byte(0x01))
			.build_json(),
	);

	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(reply.to_string())
		.create_async()
		.await;

	let client = create_client(&server.url());
	let block = client.get_block_by_hash(hash).await.unwrap().unwrap();

	assert_eq!(block.block_number(), 44_000_000);
	assert_eq!(block.block_hash(), Some(hash));
	assert_eq!(block.block_timestamp(), 1_710_000_000);
	assert_eq!(block.transactions.len(), 1);
	mock.assert();
}

#[tokio::test]
async fn test_http_500_is_transport_error() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(500)
		.with_body("upstream exploded")
		.create_async()
		.await;

	let client = create_client(&server.url());
	let error = client.get_latest_block().await.unwrap_err();

	match &error {
		RpcError::Http {
			status_code, body, ..
		} => {
			assert_eq!(status_code.as_u16(), 500);
			assert_eq!(body, "upstream exploded");
		}
		other => panic!("expected Http error, got {other:?}"),
	}
	assert!(error.is_transport());
	assert!(error.error_object().is_none());
	assert_eq!(error.to_string(), "RPC server returned status code: 500");
	mock.assert();
}

#[tokio::test]
async fn test_non_200_success_status_is_rejected() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(202)
		.with_body(latest_block_reply(1))
		.create_async()
		.await;

	let client = create_client(&server.url());
	let error = client.get_latest_block().await.unwrap_err();

	assert!(matches!(error, RpcError::Http { .. }));
	mock.assert();
}

#[tokio::test]
async fn test_error_reply_is_returned_as_server_error() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(error_reply(json!("x"), METHOD_NOT_FOUND, "the method does not exist").to_string())
		.create_async()
		.await;

	let client = create_client(&server.url());
	let error = client.call::<Value>("eth_unknown", None).await.unwrap_err();

	let object = error.error_object().unwrap();
	assert_eq!(object.code, METHOD_NOT_FOUND);
	assert_eq!(object.message, "the method does not exist");
	assert!(matches!(error, RpcError::Server(_)));
	assert!(!error.is_transport());
	assert_eq!(
		error.to_string(),
		r#"{"code":-32601,"message":"the method does not exist"}"#
	);
	mock.assert();
}

#[tokio::test]
async fn test_error_wins_over_result() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(
			json!({
				"jsonrpc": "2.0",
				"id": 1,
				"result": "0x1",
				"error": { "code": -32000, "message": "header not found" }
			})
			.to_string(),
		)
		.create_async()
		.await;

	let client = create_client(&server.url());
	let error = client.block_number().await.unwrap_err();

	assert_eq!(error.error_object().map(|o| o.code), Some(-32000));
	mock.assert();
}

#[tokio::test]
async fn test_forward_needed_reply_is_flagged() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(error_reply(json!(1), FORWARD_NEEDED, "try another upstream").to_string())
		.create_async()
		.await;

	let client = create_client(&server.url());
	let error = client.chain_id().await.unwrap_err();

	assert!(error.need_forward());
	mock.assert();
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body("<html>bad gateway</html>")
		.create_async()
		.await;

	let client = create_client(&server.url());
	let error = client.block_number().await.unwrap_err();

	assert!(matches!(error, RpcError::ResponseParse(_)), "{error:?}");
	assert!(error
		.to_string()
		.contains("Failed to decode eth_blockNumber response"));
	mock.assert();
}

#[tokio::test]
async fn test_missing_result_accepted_only_for_nullable_types() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
		.expect(2)
		.create_async()
		.await;

	let client = create_client(&server.url());

	let tx = client.get_transaction(B256::ZERO).await.unwrap();
	assert!(tx.is_none());

	let error = client.block_number().await.unwrap_err();
	assert!(matches!(error, RpcError::ResponseParse(_)));
	assert!(error.to_string().contains("Missing result in eth_blockNumber response"));
	mock.assert();
}

#[tokio::test]
async fn test_every_call_carries_a_fresh_id() {
	let seen = Arc::new(Mutex::new(Vec::<Value>::new()));
	let recorder = seen.clone();

	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body_from_request(move |request| {
			let body: Value = serde_json::from_slice(request.body().unwrap()).unwrap();
			recorder.lock().unwrap().push(body.clone());
			success_reply(body["id"].clone(), json!("0x7e4")).to_string().into_bytes()
		})
		.expect(5)
		.create_async()
		.await;

	let client = create_client(&server.url());
	for _ in 0..5 {
		assert_eq!(client.chain_id().await.unwrap(), 2020);
	}

	let requests = seen.lock().unwrap();
	let ids: HashSet<String> = requests
		.iter()
		.map(|body| {
			assert_eq!(body["jsonrpc"], "2.0");
			body["id"].as_str().unwrap().to_string()
		})
		.collect();
	assert_eq!(ids.len(), 5);
	mock.assert();
}

#[tokio::test]
async fn test_send_to_targets_other_endpoint() {
	let mut primary = Server::new_async().await;
	let untouched = primary
		.mock("POST", "/")
		.expect(0)
		.create_async()
		.await;

	let mut secondary = Server::new_async().await;
	let mock = secondary
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({ "method": "eth_blockNumber" })))
		.with_status(200)
		.with_body(success_reply(json!(1), json!("0x2a")).to_string())
		.create_async()
		.await;

	let client = create_client(&primary.url());
	let number: String = client
		.send_to(&secondary.url(), &request::block_number())
		.await
		.unwrap();

	assert_eq!(number, "0x2a");
	mock.assert();
	untouched.assert();
}

#[tokio::test]
async fn test_forward_passes_status_and_body_through() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(503)
		.with_body("maintenance")
		.create_async()
		.await;

	let client = create_client(&server.url());
	let (status, body) = client
		.forward(&Request::new("eth_chainId", None))
		.await
		.unwrap();

	assert_eq!(status.as_u16(), 503);
	assert_eq!(&body[..], b"maintenance");
	mock.assert();
}

#[tokio::test]
async fn test_get_logs_sends_range_filter() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({
			"method": "eth_getLogs",
			"params": [{ "fromBlock": "0x10", "toBlock": "latest" }]
		})))
		.with_status(200)
		.with_body(success_reply(json!(1), json!([])).to_string())
		.create_async()
		.await;

	let client = create_client(&server.url());
	let logs = client
		.get_logs(16u64.into(), request::BlockTag::Latest, None)
		.await
		.unwrap();

	assert!(logs.is_empty());
	mock.assert();
}

#[tokio::test]
async fn test_hung_server_times_out_with_request_timeout_code() {
	// Accepts connections and never answers
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let address = listener.local_addr().unwrap();
	let server = tokio::spawn(async move {
		let mut held = Vec::new();
		while let Ok((socket, _)) = listener.accept().await {
			held.push(socket);
		}
	});

	let client = JsonRpcClient::new_with_client(
		reqwest::Client::new(),
		format!("http://{}", address),
		Duration::from_millis(200),
	);

	let started = std::time::Instant::now();
	let error = client.get_latest_block().await.unwrap_err();

	assert!(error.is_timeout());
	assert_eq!(error.error_object().map(|o| o.code), Some(REQUEST_TIMEOUT));
	assert_eq!(
		error.to_string(),
		r#"{"code":-32608,"message":"request exceeds timeout"}"#
	);
	assert!(started.elapsed() < Duration::from_secs(5));

	server.abort();
}

#[tokio::test]
async fn test_get_balance_decodes_u256() {
	let address = Address::repeat_byte(0x11);
	let mut server = Server::new_async().await;
	let mock = expect_call(
		&mut server,
		"eth_getBalance",
		json!([address.to_string(), "latest"]),
		json!("0xde0b6b3a7640000"),
	)
	.await;

	let client = create_client(&server.url());
	let balance = client.get_balance(address, BlockTag::Latest).await.unwrap();

	assert_eq!(balance, U256::from(1_000_000_000_000_000_000u128));
	mock.assert();
}

#[tokio::test]
async fn test_get_transaction_receipt_decodes_logs() {
	let tx_hash = B256::repeat_byte(0x22);
	let mut server = Server::new_async().await;
	let mock = expect_call(
		&mut server,
		"eth_getTransactionReceipt",
		json!([tx_hash.to_string()]),
		json!({
			"transactionHash": hash_hex(0x22),
			"transactionIndex": "0x3",
			"blockHash": hash_hex(0x33),
			"blockNumber": "0x2a",
			"from": "0x0000000000000000000000000000000000000001",
			"to": "0x0000000000000000000000000000000000000002",
			"cumulativeGasUsed": "0x5208",
			"gasUsed": "0x5208",
			"contractAddress": null,
			"logs": [{
				"address": "0x0000000000000000000000000000000000000002",
				"topics": [hash_hex(0xaa)],
				"data": "0x",
				"blockNumber": "0x2a",
				"transactionHash": hash_hex(0x22),
				"transactionIndex": "0x3",
				"blockHash": hash_hex(0x33),
				"logIndex": "0x0",
				"removed": false
			}],
			"logsBloom": "0x00",
			"status": "0x1",
			"type": "0x2"
		}),
	)
	.await;

	let client = create_client(&server.url());
	let receipt = client.get_transaction_receipt(tx_hash).await.unwrap().unwrap();

	assert_eq!(receipt.transaction_hash, tx_hash);
	assert_eq!(receipt.transaction_index, 3);
	assert_eq!(receipt.block_number, 42);
	assert_eq!(receipt.gas_used, 21_000);
	assert!(receipt.succeeded());
	assert!(receipt.contract_address.is_none());
	assert_eq!(receipt.transaction_type, U64::from(2));
	assert_eq!(receipt.logs.len(), 1);
	assert_eq!(receipt.logs[0].topics, vec![B256::repeat_byte(0xaa)]);
	mock.assert();
}

#[tokio::test]
async fn test_unknown_block_by_number_is_none() {
	let mut server = Server::new_async().await;
	let mock = expect_call(
		&mut server,
		"eth_getBlockByNumber",
		json!(["0x10", false]),
		Value::Null,
	)
	.await;

	let client = create_client(&server.url());
	let block = client.get_block_by_number(BlockTag::Number(16)).await.unwrap();

	assert!(block.is_none());
	mock.assert();
}

#[tokio::test]
async fn test_get_block_by_number_decodes_block() {
	let mut server = Server::new_async().await;
	let mock = expect_call(
		&mut server,
		"eth_getBlockByNumber",
		json!(["pending", false]),
		BlockBuilder::new().number(7).build_json(),
	)
	.await;

	let client = create_client(&server.url());
	let block = client
		.get_block_by_number(BlockTag::Pending)
		.await
		.unwrap()
		.unwrap();

	assert_eq!(block.block_number(), 7);
	mock.assert();
}

#[tokio::test]
async fn test_trace_internals_uses_call_tracer() {
	let block_hash = B256::repeat_byte(0x44);
	let trace = json!({
		"internalTxs": [{ "opcode": "CALL", "order": 1, "success": true }],
		"dirtyAccounts": []
	});

	let mut server = Server::new_async().await;
	let mock = expect_call(
		&mut server,
		"debug_traceInternalsAndAccountsByBlockHash",
		json!([block_hash.to_string(), { "tracer": "callTracer2" }]),
		trace.clone(),
	)
	.await;

	let client = create_client(&server.url());
	let result: Value = client.trace_internals_and_accounts(block_hash).await.unwrap();

	assert_eq!(result, trace);
	mock.assert();
}

#[tokio::test]
async fn test_get_logs_by_block_hash_decodes_logs() {
	let block_hash = B256::repeat_byte(0x55);
	let mut server = Server::new_async().await;
	let mock = expect_call(
		&mut server,
		"eth_getLogs",
		json!([{ "blockHash": block_hash.to_string() }]),
		json!([{
			"address": "0x0000000000000000000000000000000000000abc",
			"topics": [],
			"data": "0x0102",
			"blockNumber": "0x1b4",
			"transactionHash": hash_hex(0x66),
			"transactionIndex": "0x1",
			"blockHash": hash_hex(0x55),
			"logIndex": "0x4",
			"removed": false
		}]),
	)
	.await;

	let client = create_client(&server.url());
	let logs = client.get_logs_by_block_hash(block_hash).await.unwrap();

	assert_eq!(logs.len(), 1);
	assert_eq!(logs[0].block_hash, block_hash);
	assert_eq!(logs[0].block_number, 436);
	assert_eq!(logs[0].index, 4);
	mock.assert();
}

#[tokio::test]
async fn test_block_transaction_counts() {
	let block_hash = B256::repeat_byte(0x77);
	let mut server = Server::new_async().await;
	let by_hash = expect_call(
		&mut server,
		"eth_getBlockTransactionCountByHash",
		json!([block_hash.to_string()]),
		json!("0x1f"),
	)
	.await;
	let by_number = expect_call(
		&mut server,
		"eth_getBlockTransactionCountByNumber",
		json!(["latest"]),
		json!("0x0"),
	)
	.await;

	let client = create_client(&server.url());
	assert_eq!(
		client
			.get_block_transaction_count_by_hash(block_hash)
			.await
			.unwrap(),
		31
	);
	assert_eq!(
		client
			.get_block_transaction_count_by_number(BlockTag::Latest)
			.await
			.unwrap(),
		0
	);
	by_hash.assert();
	by_number.assert();
}

#[tokio::test]
async fn test_get_transaction_count() {
	let address = Address::repeat_byte(0x88);
	let mut server = Server::new_async().await;
	let mock = expect_call(
		&mut server,
		"eth_getTransactionCount",
		json!([address.to_string(), "0x64"]),
		json!("0x2a"),
	)
	.await;

	let client = create_client(&server.url());
	let nonce = client
		.get_transaction_count(address, BlockTag::Number(100))
		.await
		.unwrap();

	assert_eq!(nonce, 42);
	mock.assert();
}

#[tokio::test]
async fn test_get_transaction_by_position() {
	let block_hash = B256::repeat_byte(0x99);
	let transaction = json!({
		"hash": hash_hex(0x12),
		"blockHash": hash_hex(0x99),
		"blockNumber": "0x10",
		"transactionIndex": "0x2",
		"from": "0x0000000000000000000000000000000000000001",
		"to": null,
		"nonce": "0x5",
		"input": "0x60806040"
	});

	let mut server = Server::new_async().await;
	let by_hash = expect_call(
		&mut server,
		"eth_getTransactionByBlockHashAndIndex",
		json!([block_hash.to_string(), "0x2"]),
		transaction.clone(),
	)
	.await;
	let by_number = expect_call(
		&mut server,
		"eth_getTransactionByBlockNumberAndIndex",
		json!(["0x10", "0x9"]),
		Value::Null,
	)
	.await;

	let client = create_client(&server.url());
	let found = client
		.get_transaction_by_block_hash_and_index(block_hash, 2)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(found.hash, B256::repeat_byte(0x12));
	assert_eq!(found.block_number, 16);
	assert_eq!(found.transaction_index, U64::from(2));
	assert_eq!(found.nonce, U64::from(5));
	assert!(found.is_contract_creation());

	let missing = client
		.get_transaction_by_block_number_and_index(BlockTag::Number(16), 9)
		.await
		.unwrap();
	assert!(missing.is_none());

	by_hash.assert();
	by_number.assert();
}
