//! Action dispatcher - the single writer
//!
//! The [`Dispatcher`] owns the store. Dispatching an action reads the state,
//! builds the request and spawns the network half on a tokio task; the task
//! reports back over a channel and the dispatcher settles completions one at
//! a time:
//!
//! 1. transport failure, business failure, malformed payload or a panicked
//!    task: reported, no commit
//! 2. success without a mutation (`send_code`): acknowledged
//! 3. stale under [`OrderingPolicy::LatestDispatch`]: dropped as superseded
//! 4. otherwise: exactly one mutation is committed
//!
//! # Example
//!
//! ```ignore
//! let mut dispatcher = Dispatcher::new(&config, HttpTransport::new(&config.base_url));
//!
//! let shops = dispatcher.dispatch(Action::GetShops);
//! let categories = dispatcher.dispatch(Action::GetCategories);
//! dispatcher.settle_all().await;
//!
//! shops.result().await?;
//! println!("{} shops", dispatcher.state().shops.len());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use mintshop_store::{
    Action as _, CommitFilter, CommitLog, CommitLogConfig, CommitLoggerMiddleware, Completion,
    Mutation as _, OrderingPolicy, StoreWithMiddleware, TaskKey, TaskManager, Ticket, Transport,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::action::Action;
use crate::api::{Api, Request};
use crate::config::ClientConfig;
use crate::error::ActionError;
use crate::mutation::Mutation;
use crate::reducer::reducer;
use crate::state::{AppState, Food, UserInfo};

/// How a settled action ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The named mutation was committed
    Committed(&'static str),
    /// Success that carries no state change
    Acknowledged,
    /// A newer completion for the same target was already applied
    Superseded,
}

/// Result every action reports
pub type ActionResult = Result<Outcome, ActionError>;

type TaskOutput = Result<Option<Mutation>, ActionError>;

/// Caller's side of a dispatched action
#[derive(Debug)]
pub struct ActionHandle {
    ticket: Ticket,
    rx: oneshot::Receiver<ActionResult>,
}

impl ActionHandle {
    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    /// The result, if the action has settled
    pub fn try_result(&mut self) -> Option<ActionResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(ActionError::Cancelled)),
        }
    }

    /// Wait for the result.
    ///
    /// Settling is driven by the dispatcher; awaiting a handle whose action
    /// is never settled waits until the dispatcher is dropped.
    pub async fn result(self) -> ActionResult {
        self.rx.await.unwrap_or_else(|_| Err(ActionError::Cancelled))
    }
}

struct Pending {
    action: Action,
    reply: oneshot::Sender<ActionResult>,
}

type AppStore = StoreWithMiddleware<AppState, Mutation, CommitLoggerMiddleware>;

/// Owns the state and performs actions against it
pub struct Dispatcher<T: Transport> {
    store: AppStore,
    api: Arc<Api<T>>,
    tasks: TaskManager<TaskOutput>,
    completions: mpsc::UnboundedReceiver<Completion<TaskOutput>>,
    pending: HashMap<u64, Pending>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        let (completion_tx, completions) = mpsc::unbounded_channel();

        let middleware = if config.commit_log_capacity > 0 {
            CommitLoggerMiddleware::with_log(CommitLogConfig::with_capacity(
                config.commit_log_capacity,
            ))
        } else {
            CommitLoggerMiddleware::new(CommitFilter::default())
        };

        Self {
            store: StoreWithMiddleware::new(
                AppState::new(config.latitude, config.longitude),
                reducer,
                middleware,
            ),
            api: Arc::new(Api::new(
                transport,
                config.api_prefix.clone(),
                config.mock_prefix.clone(),
            )),
            tasks: TaskManager::new(completion_tx, config.ordering),
            completions,
            pending: HashMap::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    /// Recent commits (None if the log is disabled)
    pub fn commit_log(&self) -> Option<&CommitLog> {
        self.store.middleware().log()
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.tasks.policy()
    }

    /// Number of dispatched actions not yet settled
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn is_running(&self, target: &TaskKey) -> bool {
        self.tasks.is_running(target)
    }

    /// Start an action.
    ///
    /// The request is built from the state as it is now; the call itself
    /// runs in the background until [`settle_next`](Self::settle_next)
    /// picks up its completion.
    pub fn dispatch(&mut self, action: Action) -> ActionHandle {
        let request = action.request(self.store.state());
        let api = Arc::clone(&self.api);
        let ticket = self
            .tasks
            .spawn(action.target(), perform(api, action.clone(), request));

        debug!(
            action = action.name(),
            key = %ticket.key(),
            seq = ticket.seq(),
            "dispatch"
        );

        let (reply, rx) = oneshot::channel();
        self.pending.insert(ticket.seq(), Pending { action, reply });
        ActionHandle { ticket, rx }
    }

    /// Settle the next completion to arrive.
    ///
    /// Returns false when nothing is in flight.
    pub async fn settle_next(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        match self.completions.recv().await {
            Some(completion) => {
                self.settle(completion);
                true
            }
            None => false,
        }
    }

    /// Settle until nothing is in flight
    pub async fn settle_all(&mut self) {
        while self.settle_next().await {}
    }

    /// Dispatch one action and settle until it is done.
    ///
    /// Other in-flight actions that complete first are settled on the way.
    pub async fn run(&mut self, action: Action) -> ActionResult {
        let mut handle = self.dispatch(action);
        loop {
            if let Some(result) = handle.try_result() {
                return result;
            }
            if !self.settle_next().await {
                return Err(ActionError::Cancelled);
            }
        }
    }

    /// Abort every in-flight action writing `target`.
    ///
    /// Their handles resolve to [`ActionError::Cancelled`]. Returns how many
    /// were aborted.
    pub fn cancel(&mut self, target: &TaskKey) -> usize {
        let tickets = self.tasks.cancel(target);
        for ticket in &tickets {
            if let Some(pending) = self.pending.remove(&ticket.seq()) {
                debug!(
                    action = pending.action.name(),
                    key = %ticket.key(),
                    seq = ticket.seq(),
                    "cancelled"
                );
                let _ = pending.reply.send(Err(ActionError::Cancelled));
            }
        }
        tickets.len()
    }

    // ===== Synchronous actions =====

    /// Store a user obtained outside the dispatcher.
    ///
    /// The write takes a ticket on the user target, so under
    /// [`OrderingPolicy::LatestDispatch`] a fetch dispatched before it is
    /// superseded instead of overwriting it.
    pub fn record_user(&mut self, user: UserInfo) -> bool {
        let ticket = self.tasks.stamp(Action::GetUserInfo.target());
        let changed = self.store.commit(Mutation::ReceiveUserInfo(user));
        self.tasks.mark_applied(&ticket);
        changed
    }

    /// Add or remove one unit of a dish
    pub fn update_food_count(&mut self, food: &Food, is_add: bool) -> bool {
        let mutation = if is_add {
            Mutation::IncrementFoodCount(food.clone())
        } else {
            Mutation::DecrementFoodCount(food.clone())
        };
        self.store.commit(mutation)
    }

    pub fn clear_cart(&mut self) -> bool {
        self.store.commit(Mutation::ClearCart)
    }

    fn settle(&mut self, completion: Completion<TaskOutput>) {
        let Completion { ticket, output } = completion;
        self.tasks.finish(&ticket);

        // Cancelled actions have already been answered
        let Some(Pending { action, reply }) = self.pending.remove(&ticket.seq()) else {
            debug!(key = %ticket.key(), seq = ticket.seq(), "completion after cancel dropped");
            return;
        };

        let output = output.map_err(ActionError::from).and_then(|output| output);
        let result = self.apply(&action, &ticket, output);
        // The caller may have dropped its handle
        let _ = reply.send(result);
    }

    fn apply(&mut self, action: &Action, ticket: &Ticket, output: TaskOutput) -> ActionResult {
        let mutation = match output {
            Ok(Some(mutation)) => mutation,
            Ok(None) => {
                debug!(action = action.name(), seq = ticket.seq(), "acknowledged");
                return Ok(Outcome::Acknowledged);
            }
            Err(err) => {
                warn!(
                    action = action.name(),
                    key = %ticket.key(),
                    seq = ticket.seq(),
                    error = %err,
                    "action failed"
                );
                return Err(err);
            }
        };

        if self.tasks.is_stale(ticket) {
            warn!(
                action = action.name(),
                key = %ticket.key(),
                seq = ticket.seq(),
                "stale completion dropped"
            );
            return Ok(Outcome::Superseded);
        }

        let name = mutation.name();
        self.store.commit(mutation);
        self.tasks.mark_applied(ticket);
        Ok(Outcome::Committed(name))
    }
}

/// Network half of an action, run on a spawned task
async fn perform<T: Transport>(api: Arc<Api<T>>, action: Action, request: Request) -> TaskOutput {
    let envelope = api.call(&request).await?;
    action.into_mutation(envelope)
}
