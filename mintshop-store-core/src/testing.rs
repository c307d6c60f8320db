//! Test utilities for mintshop-store applications
//!
//! - [`MockTransport`]: scripted [`Transport`] with per-path reply queues,
//!   virtual delays and request recording
//! - [`assert_committed!`] / [`assert_not_committed!`]: assertions over
//!   committed mutation names
//!
//! # Example
//!
//! ```ignore
//! use mintshop_store::testing::{MockTransport, Reply};
//! use serde_json::json;
//!
//! let transport = MockTransport::new();
//! transport.reply("/api/shops", Reply::ok(json!([{"id": 1}])));
//! transport.reply("/api/shops", Reply::failure(1, "no shops").after_ms(50));
//!
//! // ... drive the dispatcher ...
//!
//! assert_eq!(transport.requests()[0].path, "/api/shops");
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::envelope::Envelope;
use crate::transport::{Method, Params, Transport, TransportError};

/// One scripted answer
#[derive(Debug, Clone)]
pub struct Reply {
    outcome: Result<Envelope, String>,
    delay: Duration,
}

impl Reply {
    /// `{ code: 0, data }`
    pub fn ok(data: Value) -> Self {
        Self::envelope(Envelope::ok(data))
    }

    /// `{ code, msg }`
    pub fn failure(code: i64, msg: impl Into<String>) -> Self {
        Self::envelope(Envelope::failure(code, msg))
    }

    /// Any envelope, verbatim
    pub fn envelope(envelope: Envelope) -> Self {
        Self {
            outcome: Ok(envelope),
            delay: Duration::ZERO,
        }
    }

    /// Transport-level failure
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            delay: Duration::ZERO,
        }
    }

    /// Deliver the reply after `delay`
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn after_ms(self, millis: u64) -> Self {
        self.after(Duration::from_millis(millis))
    }
}

/// A request as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub params: Params,
    pub method: Method,
}

#[derive(Debug, Default)]
struct MockState {
    replies: HashMap<String, VecDeque<Reply>>,
    requests: Vec<RecordedRequest>,
}

/// Scripted transport for tests.
///
/// Replies are queued per path and consumed in request order. A request
/// for a path with an empty queue fails with [`TransportError::Connection`].
/// Clones share the same script and request record.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a reply for `path`.
    pub fn reply(&self, path: impl Into<String>, reply: Reply) -> &Self {
        self.lock()
            .replies
            .entry(path.into())
            .or_default()
            .push_back(reply);
        self
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of replies still queued across all paths.
    pub fn pending_replies(&self) -> usize {
        self.lock().replies.values().map(VecDeque::len).sum()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        path: &str,
        params: &Params,
        method: Method,
    ) -> Result<Envelope, TransportError> {
        let reply = {
            let mut state = self.lock();
            state.requests.push(RecordedRequest {
                path: path.to_string(),
                params: params.clone(),
                method,
            });
            state.replies.get_mut(path).and_then(VecDeque::pop_front)
        };

        let Some(reply) = reply else {
            return Err(TransportError::Connection(format!(
                "no reply scripted for {}",
                path
            )));
        };

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.outcome.map_err(TransportError::Connection)
    }
}

/// Assert that a mutation with the given name was committed.
///
/// # Example
///
/// ```ignore
/// let names = dispatcher.commit_log().names();
/// assert_committed!(names, "receive_shops");
/// ```
#[macro_export]
macro_rules! assert_committed {
    ($names:expr, $name:expr) => {
        assert!(
            $names.iter().any(|n| *n == $name),
            "Expected mutation `{}` to be committed, but got: {:?}",
            $name,
            $names
        );
    };
}

/// Assert that no mutation with the given name was committed.
#[macro_export]
macro_rules! assert_not_committed {
    ($names:expr, $name:expr) => {
        assert!(
            !$names.iter().any(|n| *n == $name),
            "Expected mutation `{}` NOT to be committed, but it was: {:?}",
            $name,
            $names
        );
    };
}
