//! Scripted executor for unit tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::http::{HttpExecutor, HttpRequest, HttpResponse, NetworkError};

struct Reply {
    outcome: Result<HttpResponse, NetworkError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Replays queued replies in request order and records every request.
///
/// A reply is bound to a request when the request is sent, so completion
/// order can be controlled with gated replies independently of send order.
#[derive(Default)]
pub(crate) struct ScriptedExecutor {
    requests: Mutex<Vec<HttpRequest>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl ScriptedExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, status: u16, body: &str) {
        self.replies.lock().push_back(Reply {
            outcome: Ok(response(status, body)),
            gate: None,
        });
    }

    /// Queue a reply that is held back until the returned sender fires.
    pub(crate) fn reply_gated(&self, status: u16, body: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().push_back(Reply {
            outcome: Ok(response(status, body)),
            gate: Some(rx),
        });
        tx
    }

    pub(crate) fn fail(&self, message: &str) {
        self.replies.lock().push_back(Reply {
            outcome: Err(NetworkError(message.to_string())),
            gate: None,
        });
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: Vec::new(),
        body: body.to_string(),
    }
}

#[async_trait]
impl HttpExecutor for ScriptedExecutor {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        self.requests.lock().push(request);
        let reply = self.replies.lock().pop_front();
        let Some(reply) = reply else {
            return Err(NetworkError("no scripted reply".to_string()));
        };
        if let Some(gate) = reply.gate {
            let _ = gate.await;
        }
        reply.outcome
    }
}
