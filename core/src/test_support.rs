use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Answers every request with the same response and remembers what was sent.
#[derive(Clone)]
pub(crate) struct RecordingTransport {
    response: HttpResponse,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl RecordingTransport {
    pub(crate) fn new(response: HttpResponse) -> Self {
        Self {
            response,
            requests: Arc::default(),
        }
    }

    pub(crate) fn ok(body: Value) -> Self {
        Self::new(HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/hal+json".to_string())],
            body: body.to_string(),
        })
    }

    pub(crate) fn no_content() -> Self {
        Self::new(HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        })
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.response.clone())
    }
}
