//! In-memory transport double for unit tests

use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays scripted replies in order and records every request it receives
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a `200 OK` reply
    pub fn reply(self, body: &str) -> Self {
        self.reply_with(HttpResponse::ok(body))
    }

    /// Queue a reply with an explicit status
    pub fn reply_status(self, status: StatusCode, body: &str) -> Self {
        self.reply_with(HttpResponse::new(status, body))
    }

    pub fn reply_with(self, response: HttpResponse) -> Self {
        self.replies.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a transport-level failure
    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Other(message.to_string())));
        self
    }

    /// All requests received so far, oldest first
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of requests whose URL path is `path`
    pub fn calls_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.url.path() == path)
            .count()
    }

    pub fn unused_replies(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted reply left".to_string())))
    }
}
