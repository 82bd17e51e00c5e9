use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use ghsync_core::error::GhSyncError;

use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

/// Scripted in-memory transport for testing.
///
/// Responses are queued per `(method, url)`. Each call consumes the front of
/// the queue, except that the last response stays and answers every further
/// call. Unscripted routes answer 404. Every request is recorded.
///
/// A route scripted with [`MemoryTransport::fail`] errors the way a dropped
/// connection does instead of answering.
pub struct MemoryTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Result<ApiResponse, String>>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue `response` for the next call to `method url`.
    pub fn on(&self, method: Method, url: &str, response: ApiResponse) -> &Self {
        self.script(method, url, Ok(response))
    }

    /// Queue a transport failure for the next call to `method url`.
    pub fn fail(&self, method: Method, url: &str, message: &str) -> &Self {
        self.script(method, url, Err(message.to_string()))
    }

    fn script(&self, method: Method, url: &str, outcome: Result<ApiResponse, String>) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, url.to_string()))
            .or_default()
            .push_back(outcome);
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// How many times `method url` was called.
    pub fn count(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    /// How many calls used `method`, whatever the URL.
    pub fn count_method(&self, method: Method) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GhSyncError> {
        let key = (request.method, request.url.clone());
        self.requests.lock().unwrap().push(request);

        let mut routes = self.routes.lock().unwrap();
        let outcome = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        match outcome {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(GhSyncError::connection(message)),
            None => Ok(ApiResponse::json(
                404,
                serde_json::json!({ "message": "404 Not Found" }),
            )),
        }
    }
}
