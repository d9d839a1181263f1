use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::{
    http::{HttpRequest, HttpResponse},
    transport::{Transport, TransportError},
};

/// Records every request and answers with queued replies
///
/// Once the queue runs dry, every request is answered with `200 {}`.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    requests: Mutex<Vec<HttpRequest>>,
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, reply: Result<HttpResponse, TransportError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn push_status(&self, status: u16) {
        self.push(Ok(HttpResponse::new(status, "")));
    }

    pub(crate) fn push_tokens(&self, access: &str, refresh: &str, expires_in: u64) {
        self.push(Ok(token_response(access, refresh, expires_in)));
    }

    pub(crate) fn clear(&self) {
        self.requests.lock().unwrap().clear();
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(200, "{}")))
    }
}

pub(crate) fn token_response(access: &str, refresh: &str, expires_in: u64) -> HttpResponse {
    let body = json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": expires_in,
        "token_type": "Bearer",
    });
    HttpResponse::new(200, body.to_string())
}

/// The value of a field in a request's body, if it is a string
pub(crate) fn field<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request.payload.fields().get(name).and_then(|v| v.as_str())
}
