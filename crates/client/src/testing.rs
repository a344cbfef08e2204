// Recording transport for unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use workers_kit_core::{Result, Scope};

use crate::client::Client;
use crate::transport::{ApiRequest, Method, RequestBody, Transport};

/// Answers calls from canned `(method, path)` responses and records every request
#[derive(Default)]
pub(crate) struct RecordingTransport {
    responses: Mutex<Vec<(Method, String, Value)>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, method: Method, url: &str, response: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push((method, url.to_string(), response));
        self
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// `"METHOD url"` of every recorded call, in order
    pub(crate) fn call_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| format!("{} {}", call.method, call.url))
            .collect()
    }

    pub(crate) fn last_call(&self) -> ApiRequest {
        self.calls().pop().expect("no call was recorded")
    }

    /// Client over this transport; the returned Arc keeps the recording visible
    pub(crate) fn into_client(self, defaults: Scope) -> (Client, Arc<RecordingTransport>) {
        let transport = Arc::new(self);
        let client = Client::with_transport(transport.clone(), defaults);
        (client, transport)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn call(&self, request: ApiRequest) -> Result<Value> {
        let response = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .find(|(method, url, _)| *method == request.method && *url == request.url)
            .map(|(_, _, response)| response.clone())
            .unwrap_or_else(|| {
                json!({
                    "success": false,
                    "errors": [{"code": 7003, "message": "Could not route to the requested URL"}]
                })
            });
        self.calls.lock().unwrap().push(request);
        Ok(response)
    }
}

/// Text body of a request
pub(crate) fn text_body(request: &ApiRequest) -> &str {
    match &request.body {
        Some(RequestBody::Text(text)) => text,
        other => panic!("expected text body, got {:?}", other),
    }
}

pub(crate) fn ok(result: Value) -> Value {
    json!({"success": true, "errors": [], "messages": [], "result": result})
}

pub(crate) fn failed(code: i64, message: &str) -> Value {
    json!({
        "success": false,
        "errors": [{"code": code, "message": message}],
        "messages": [],
        "result": null
    })
}
