//! mintshop-client: state synchronization for the mintshop food-ordering API
//!
//! - [`state`]: the application state and the wire entities it holds
//! - [`mutation`] / [`reducer`]: the closed set of state transitions
//! - [`api`]: endpoint table bound to a [`Transport`](mintshop_store::Transport)
//! - [`action`]: what each remote operation sends and commits
//! - [`dispatcher`]: owns the store, runs actions, orders their completions
//! - [`getters`]: cart and rating aggregates
//!
//! ```ignore
//! use mintshop_client::{Action, ClientConfig, Dispatcher};
//! use mintshop_store::HttpTransport;
//!
//! let config = ClientConfig::default();
//! let mut dispatcher = Dispatcher::new(&config, HttpTransport::new(&config.base_url));
//! dispatcher.run(Action::GetAddress).await?;
//! ```

pub mod action;
pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod getters;
pub mod mutation;
pub mod reducer;
pub mod state;

pub use action::Action;
pub use api::{Api, Request};
pub use config::ClientConfig;
pub use dispatcher::{ActionHandle, ActionResult, Dispatcher, Outcome};
pub use error::{ActionError, ConfigError};
pub use mutation::Mutation;
pub use reducer::reducer;
pub use state::AppState;
