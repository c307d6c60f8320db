//! Mutation trait for type-safe state transitions

use std::fmt::Debug;

/// A named, synchronous state transition
///
/// Mutations are the only values a [`Store`](crate::Store) accepts. Implement
/// this on a closed enum with one variant per transition, each variant carrying
/// its own payload, so an unknown mutation name cannot be expressed at all.
///
/// Use `#[derive(Mutation)]` from `mintshop-store-macros` to auto-implement this trait.
pub trait Mutation: Clone + Debug + Send + 'static {
    /// Get the mutation name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Short human-readable description of a mutation for commit logs.
///
/// The default uses the `Debug` output, which is fine for small payloads.
/// Override it for mutations that carry whole lists.
pub trait MutationSummary: Mutation {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
