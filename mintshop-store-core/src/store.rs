//! Centralized state container with reducer pattern

use crate::Mutation;
use std::marker::PhantomData;

/// A reducer function that applies mutations to state
///
/// Returns `true` if the state changed.
pub type Reducer<S, M> = fn(&mut S, M) -> bool;

/// Centralized state container with a Redux-like reducer
///
/// The store holds the application state and is the single point through
/// which it changes. There is no `state_mut`: every write goes
/// through [`Store::commit`], so the reducer is the only code that touches
/// the fields.
///
/// # Type Parameters
/// * `S` - The application state type
/// * `M` - The mutation type (must implement `Mutation`)
///
/// # Example
/// ```ignore
/// #[derive(Default)]
/// struct AppState {
///     shops: Vec<String>,
/// }
///
/// #[derive(Mutation, Clone, Debug)]
/// enum AppMutation {
///     ReceiveShops(Vec<String>),
/// }
///
/// fn reducer(state: &mut AppState, mutation: AppMutation) -> bool {
///     match mutation {
///         AppMutation::ReceiveShops(shops) => {
///             state.shops = shops;
///             true
///         }
///     }
/// }
///
/// let mut store = Store::new(AppState::default(), reducer);
/// store.commit(AppMutation::ReceiveShops(vec!["Noodle House".into()]));
/// assert_eq!(store.state().shops.len(), 1);
/// ```
pub struct Store<S, M: Mutation> {
    state: S,
    reducer: Reducer<S, M>,
    _marker: PhantomData<M>,
}

impl<S, M: Mutation> Store<S, M> {
    /// Create a new store with initial state and reducer
    pub fn new(state: S, reducer: Reducer<S, M>) -> Self {
        Self {
            state,
            reducer,
            _marker: PhantomData,
        }
    }

    /// Commit a mutation to the store
    ///
    /// The reducer will be called with the current state and mutation.
    /// Returns `true` if the state changed.
    pub fn commit(&mut self, mutation: M) -> bool {
        (self.reducer)(&mut self.state, mutation)
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        &self.state
    }
}

/// Store with middleware support
///
/// Wraps a `Store` and lets middleware observe mutations
/// before and after they are applied by the reducer.
pub struct StoreWithMiddleware<S, M: Mutation, W: Middleware<M>> {
    store: Store<S, M>,
    middleware: W,
}

impl<S, M: Mutation, W: Middleware<M>> StoreWithMiddleware<S, M, W> {
    /// Create a new store with middleware
    pub fn new(state: S, reducer: Reducer<S, M>, middleware: W) -> Self {
        Self {
            store: Store::new(state, reducer),
            middleware,
        }
    }

    /// Commit a mutation through middleware and store
    pub fn commit(&mut self, mutation: M) -> bool {
        self.middleware.before(&mutation);
        let changed = self.store.commit(mutation.clone());
        self.middleware.after(&mutation, changed);
        changed
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        self.store.state()
    }

    /// Get a reference to the middleware
    pub fn middleware(&self) -> &W {
        &self.middleware
    }

    /// Get a mutable reference to the middleware
    pub fn middleware_mut(&mut self) -> &mut W {
        &mut self.middleware
    }
}

/// Middleware trait for observing mutations
///
/// Implement this trait to add logging, persistence, or other
/// cross-cutting concerns to your store.
pub trait Middleware<M: Mutation> {
    /// Called before the mutation is applied by the reducer
    fn before(&mut self, mutation: &M);

    /// Called after the mutation is applied by the reducer
    fn after(&mut self, mutation: &M, state_changed: bool);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<M: Mutation> Middleware<M> for NoopMiddleware {
    fn before(&mut self, _mutation: &M) {}
    fn after(&mut self, _mutation: &M, _state_changed: bool) {}
}
