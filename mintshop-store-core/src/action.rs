//! Action trait for asynchronous intents

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to a dispatcher
///
/// Actions describe an intent to synchronize some part of the state with the
/// remote service. They should be:
/// - Clone: Actions may be logged or re-dispatched
/// - Debug: For debugging and logging
/// - Send + 'static: The network half of an action runs on a spawned task
///
/// Use `#[derive(Action)]` from `mintshop-store-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}
