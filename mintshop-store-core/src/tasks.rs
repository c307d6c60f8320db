//! Task manager for in-flight remote calls
//!
//! Every spawned future gets a [`Ticket`]: its [`TaskKey`] (the state target
//! it will write) plus a sequence number that grows with dispatch order. When
//! the future finishes, its output travels back over an mpsc channel wrapped
//! in a [`Completion`]; the owner of the state decides what to do with it.
//!
//! Several tasks may be in flight for the same key. Nothing is cancelled
//! implicitly. Whether a late completion may still write is decided by the
//! [`OrderingPolicy`]:
//!
//! - [`OrderingPolicy::LastArrival`]: whatever arrives last wins.
//! - [`OrderingPolicy::LatestDispatch`]: a completion is stale once a ticket
//!   dispatched after it has already been applied for the same key.
//!
//! # Example
//!
//! ```ignore
//! use mintshop_store::tasks::{OrderingPolicy, TaskManager};
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut tasks = TaskManager::new(tx, OrderingPolicy::LatestDispatch);
//!
//! let ticket = tasks.spawn("shops", async { fetch_shops().await });
//!
//! while let Some(done) = rx.recv().await {
//!     tasks.finish(&done.ticket);
//!     if !tasks.is_stale(&done.ticket) {
//!         apply(done.output);
//!         tasks.mark_applied(&done.ticket);
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinError, JoinHandle};

/// Identifies the state target a task writes.
///
/// Tasks with the same key are ordered against each other; tasks with
/// different keys never interfere.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    /// Create a new task key.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the key name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Dispatch stamp of one spawned task
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Ticket {
    key: TaskKey,
    seq: u64,
}

impl Ticket {
    pub fn key(&self) -> &TaskKey {
        &self.key
    }

    /// Global dispatch sequence number (starts at 1)
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// A spawned future panicked instead of producing its output
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("task panicked: {0}")]
pub struct TaskPanicked(pub String);

impl TaskPanicked {
    fn from_join_error(err: JoinError) -> Self {
        let payload = err.into_panic();
        let message = if let Some(msg) = payload.downcast_ref::<&str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self(message)
    }
}

/// Output of a finished task, tagged with its ticket
///
/// Every task that is not cancelled produces exactly one completion, even
/// when its future panics.
#[derive(Debug)]
pub struct Completion<C> {
    pub ticket: Ticket,
    pub output: Result<C, TaskPanicked>,
}

/// How completions for the same key are ordered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// No fencing: the last completion to arrive determines the state.
    LastArrival,
    /// Completions older than the newest applied ticket for their key are dropped.
    #[default]
    LatestDispatch,
}

/// Spawns and tracks in-flight tasks.
///
/// # Type Parameters
///
/// - `C`: The output type that tasks produce
pub struct TaskManager<C> {
    tasks: HashMap<u64, (TaskKey, AbortHandle)>,
    applied: HashMap<TaskKey, u64>,
    next_seq: u64,
    policy: OrderingPolicy,
    completion_tx: mpsc::UnboundedSender<Completion<C>>,
}

impl<C> TaskManager<C>
where
    C: Send + 'static,
{
    /// Create a new task manager.
    ///
    /// Finished tasks send their [`Completion`] on `completion_tx`.
    pub fn new(completion_tx: mpsc::UnboundedSender<Completion<C>>, policy: OrderingPolicy) -> Self {
        Self {
            tasks: HashMap::new(),
            applied: HashMap::new(),
            next_seq: 0,
            policy,
            completion_tx,
        }
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.policy
    }

    /// Spawn a task writing `key` and return its ticket.
    ///
    /// Other tasks with the same key keep running.
    pub fn spawn<F>(&mut self, key: impl Into<TaskKey>, future: F) -> Ticket
    where
        F: Future<Output = C> + Send + 'static,
    {
        self.next_seq += 1;
        let ticket = Ticket {
            key: key.into(),
            seq: self.next_seq,
        };

        let worker: JoinHandle<C> = tokio::spawn(future);
        let abort = worker.abort_handle();

        // Watches the worker so a panic still reports back
        let tx = self.completion_tx.clone();
        let done = ticket.clone();
        tokio::spawn(async move {
            let output = match worker.await {
                Ok(output) => Ok(output),
                Err(err) if err.is_panic() => {
                    tracing::warn!(key = %done.key, seq = done.seq, "task panicked");
                    Err(TaskPanicked::from_join_error(err))
                }
                // Aborted through cancel(); the owner already knows
                Err(_) => return,
            };
            // Receiver gone means the owner shut down
            let _ = tx.send(Completion {
                ticket: done,
                output,
            });
        });

        self.tasks.insert(ticket.seq, (ticket.key.clone(), abort));
        ticket
    }

    /// Issue a ticket for a write that happens without a task.
    ///
    /// Marking it applied makes every completion dispatched before it stale
    /// under [`OrderingPolicy::LatestDispatch`].
    pub fn stamp(&mut self, key: impl Into<TaskKey>) -> Ticket {
        self.next_seq += 1;
        Ticket {
            key: key.into(),
            seq: self.next_seq,
        }
    }

    /// Forget a task whose completion has been received.
    pub fn finish(&mut self, ticket: &Ticket) {
        self.tasks.remove(&ticket.seq);
    }

    /// Whether a completion must be dropped instead of applied.
    pub fn is_stale(&self, ticket: &Ticket) -> bool {
        match self.policy {
            OrderingPolicy::LastArrival => false,
            OrderingPolicy::LatestDispatch => self
                .applied
                .get(&ticket.key)
                .is_some_and(|&applied| applied > ticket.seq),
        }
    }

    /// Record that a ticket's output was written to the state.
    pub fn mark_applied(&mut self, ticket: &Ticket) {
        let applied = self.applied.entry(ticket.key.clone()).or_insert(0);
        *applied = (*applied).max(ticket.seq);
    }

    /// Abort every in-flight task writing `key`; returns their tickets.
    pub fn cancel(&mut self, key: &TaskKey) -> Vec<Ticket> {
        let seqs: Vec<u64> = self
            .tasks
            .iter()
            .filter(|(_, (k, _))| k == key)
            .map(|(seq, _)| *seq)
            .collect();

        let mut cancelled = Vec::with_capacity(seqs.len());
        for seq in seqs {
            if let Some((key, handle)) = self.tasks.remove(&seq) {
                handle.abort();
                cancelled.push(Ticket { key, seq });
            }
        }
        cancelled.sort_by_key(|t| t.seq);
        cancelled
    }

    /// Abort all running tasks.
    pub fn cancel_all(&mut self) -> Vec<Ticket> {
        let mut cancelled: Vec<Ticket> = self
            .tasks
            .drain()
            .map(|(seq, (key, handle))| {
                handle.abort();
                Ticket { key, seq }
            })
            .collect();
        cancelled.sort_by_key(|t| t.seq);
        cancelled
    }

    /// Check if any task writing `key` is in flight.
    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks.values().any(|(k, _)| k == key)
    }

    /// Number of tasks in flight.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Keys of all in-flight tasks (one entry per task).
    pub fn running_keys(&self) -> impl Iterator<Item = &TaskKey> {
        self.tasks.values().map(|(k, _)| k)
    }
}

impl<C> Drop for TaskManager<C> {
    fn drop(&mut self) {
        for (_, (_, handle)) in self.tasks.drain() {
            handle.abort();
        }
    }
}
