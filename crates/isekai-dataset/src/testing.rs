//! Scriptable transport for unit tests.

use crate::api::transport::{Transport, TransportError, TransportResponse};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

pub type MockResult = Result<TransportResponse, TransportError>;

type Handler = Box<dyn Fn(&RecordedRequest) -> MockResult + Send + Sync>;

/// A request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn page(&self) -> u32 {
        self.param("page").and_then(|p| p.parse().ok()).unwrap_or(1)
    }
}

/// Transport that answers from a handler and records every request
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&RecordedRequest) -> MockResult + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer requests in order from a fixed script
    pub fn sequence(responses: Vec<MockResult>) -> Self {
        let script = Mutex::new(VecDeque::from(responses));
        Self::new(move |request| {
            script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unscripted request to {}", request.url))
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests whose URL ends with `suffix`
    pub fn requests_to(&self, suffix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.ends_with(suffix))
            .collect()
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &self.request_count())
            .finish()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> MockResult {
        let request = RecordedRequest {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(&request)
    }
}

/// 200 response with a JSON body
pub fn ok(body: Value) -> MockResult {
    Ok(TransportResponse {
        status: StatusCode::OK,
        body: body.to_string(),
    })
}

/// Empty-bodied response with the given status
pub fn status(code: u16) -> MockResult {
    Ok(TransportResponse {
        status: StatusCode::from_u16(code).unwrap(),
        body: String::new(),
    })
}
