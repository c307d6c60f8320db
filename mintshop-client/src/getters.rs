//! Derived views over the state
//!
//! Recomputed on every call from `&AppState`; nothing is cached. Sums start
//! at zero and prices are summed as raw floats without rounding.

use crate::state::AppState;

/// Rating type of a positive review
pub const POSITIVE_RATE_TYPE: u8 = 0;

/// Units in the cart
pub fn total_count(state: &AppState) -> u32 {
    state.cart_foods.iter().map(|item| item.count).sum()
}

/// Sum of `count * price` over the cart
pub fn total_price(state: &AppState) -> f64 {
    state
        .cart_foods
        .iter()
        .map(|item| f64::from(item.count) * item.price)
        .sum()
}

/// Number of positive ratings
pub fn positive_size(state: &AppState) -> usize {
    state
        .ratings
        .iter()
        .filter(|rating| rating.rate_type == POSITIVE_RATE_TYPE)
        .count()
}
