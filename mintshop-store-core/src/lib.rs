//! Core traits and types for mintshop-store
//!
//! This crate provides the foundational pieces for keeping a client-side state
//! container in sync with a remote service that answers in `{ code, data }`
//! envelopes, following a Redux/Vuex-inspired architecture.
//!
//! # Core Concepts
//!
//! - **Mutation**: A named, synchronous state transition; the only way state changes
//! - **Store**: Centralized state container applying mutations through a reducer
//! - **Action**: An intent that performs one remote call and commits at most one mutation
//! - **Transport**: One remote call in, one decoded [`Envelope`] out
//! - **TaskManager**: Spawns the network half of actions and sequences completions
//!
//! # Basic Example
//!
//! ```ignore
//! use mintshop_store_core::prelude::*;
//!
//! #[derive(Mutation, Clone, Debug)]
//! enum AppMutation {
//!     ReceiveCategories(Vec<String>),
//!     ClearCart,
//! }
//!
//! #[derive(Default)]
//! struct AppState {
//!     categories: Vec<String>,
//!     cart: Vec<u32>,
//! }
//!
//! fn reducer(state: &mut AppState, mutation: AppMutation) -> bool {
//!     match mutation {
//!         AppMutation::ReceiveCategories(categories) => { state.categories = categories; true }
//!         AppMutation::ClearCart => { state.cart.clear(); true }
//!     }
//! }
//!
//! let mut store = Store::new(AppState::default(), reducer);
//! store.commit(AppMutation::ClearCart);
//! ```
//!
//! # Single-Writer Pattern
//!
//! Network calls never touch the state. They run on spawned tasks and report
//! back over a channel; the owner of the store applies results one at a time:
//!
//! 1. **Dispatch** reads what it needs from the state, builds the request and
//!    spawns it through [`TaskManager::spawn`], receiving a [`Ticket`]
//! 2. **Completion** arrives on the channel; the owner checks the envelope
//!    code and the [`OrderingPolicy`], then commits at most one mutation

pub mod action;
pub mod commit_log;
pub mod envelope;
pub mod mutation;
pub mod store;
pub mod tasks;
pub mod testing;
pub mod transport;

// Core trait exports
pub use action::Action;
pub use mutation::{Mutation, MutationSummary};

// Store exports
pub use commit_log::{
    glob_match, CommitFilter, CommitLog, CommitLogConfig, CommitLogEntry, CommitLoggerMiddleware,
};
pub use store::{Middleware, NoopMiddleware, Reducer, Store, StoreWithMiddleware};

// Remote call exports
pub use envelope::{Envelope, SUCCESS_CODE};
pub use transport::{query_url, HttpTransport, Method, Params, Transport, TransportError};

// Task exports
pub use tasks::{Completion, OrderingPolicy, TaskKey, TaskManager, TaskPanicked, Ticket};

// Testing exports
pub use testing::{MockTransport, RecordedRequest, Reply};

// Re-exported so implementors of `Transport` need not depend on it directly
pub use async_trait::async_trait;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::commit_log::{CommitFilter, CommitLogConfig, CommitLoggerMiddleware};
    pub use crate::envelope::Envelope;
    pub use crate::mutation::{Mutation, MutationSummary};
    pub use crate::store::{Middleware, NoopMiddleware, Reducer, Store, StoreWithMiddleware};
    pub use crate::tasks::{OrderingPolicy, TaskKey, TaskManager, Ticket};
    pub use crate::transport::{HttpTransport, Method, Params, Transport, TransportError};
}
