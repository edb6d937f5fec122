//! In-memory transport double for driving the facade without a server.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracking::{ApiResponse, ApiTransport, Method, QueryParams, TransportError};

pub const BASE_URL: &str = "http://tracking.test/";

/// A request seen by [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub params: QueryParams,
}

impl RecordedRequest {
    /// Parses a query parameter that carries JSON text.
    pub fn json_param(&self, key: &str) -> Value {
        let raw = self
            .params
            .get(key)
            .unwrap_or_else(|| panic!("missing query parameter {key}"));
        serde_json::from_str(raw).expect("parameter is not JSON")
    }
}

/// Replays scripted responses in order and records every request.
///
/// Once the script runs out every request fails with a transport error so a
/// test notices requests it did not expect.
#[derive(Debug)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(&self, body: Value) {
        let response = ApiResponse::try_from(body).expect("scripted body must be an object");
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn respond_success(&self, id: u64) {
        self.respond(json!({"success": true, "id": id}));
    }

    pub fn fail(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ApiTransport for RecordingTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &QueryParams,
    ) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_string(),
            params: params.clone(),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Request {
                    url: format!("{BASE_URL}{path}"),
                    message: "no scripted response".to_string(),
                })
            })
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }
}

pub fn connection_refused(path: &str) -> TransportError {
    TransportError::Request {
        url: format!("{BASE_URL}{path}"),
        message: "connection refused".to_string(),
    }
}
