//! mintshop-store: single-writer state synchronization for envelope APIs
//!
//! Like Vuex/Redux, but the writes come back from the network. Actions spawn
//! remote calls, completions are gated on the `{ code, data }` envelope, and
//! a closed set of mutations is the only thing allowed to change the state.
//!
//! # Example
//! ```ignore
//! use mintshop_store::prelude::*;
//!
//! #[derive(Mutation, Clone, Debug)]
//! enum AppMutation {
//!     ReceiveShops(Vec<Shop>),
//!     ClearCart,
//! }
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     GetShops,
//! }
//! ```

// Re-export everything from core
pub use mintshop_store_core::*;

// Re-export derive macros
pub use mintshop_store_macros::{Action, Mutation};

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use mintshop_store_core::{Action, Mutation, MutationSummary};

    // Store
    pub use mintshop_store_core::{
        CommitFilter, CommitLogConfig, CommitLoggerMiddleware, Middleware, NoopMiddleware, Reducer,
        Store, StoreWithMiddleware,
    };

    // Remote calls and tasks
    pub use mintshop_store_core::{
        Envelope, HttpTransport, Method, OrderingPolicy, Params, TaskKey, TaskManager, Ticket,
        Transport, TransportError,
    };

    // Derive macros
    pub use mintshop_store_macros::{Action, Mutation};
}
