#![no_main]

use libfuzzer_sys::fuzz_target;
use node_audit::services::rpc::{BatchResponse, Response};
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    if let Ok(batch) = serde_json::from_slice::<BatchResponse<Value>>(data) {
        let errors = batch.errors();
        assert_eq!(batch.to_error().map_or(0, |e| e.len()), errors.len());
        assert_eq!(batch.result().len(), batch.len());
    }
    if let Ok(response) = Response::<Value>::from_slice(data) {
        if let Some(error) = response.error {
            let _ = error.to_error().to_string();
        }
    }
});
