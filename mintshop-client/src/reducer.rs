//! Reducer - the mutation registry
//!
//! fn(state: &mut AppState, mutation: Mutation) -> bool
//! - The only code that writes to `AppState`
//! - Each arm touches exactly the field its mutation names
//! - Fetched entities are replaced wholesale; only the cart changes incrementally
//! - Returns true if the state changed

use crate::mutation::Mutation;
use crate::state::{AppState, CartFood};

/// Apply one mutation
///
/// # Cart counts
/// Counts never go below zero. Decrementing a line down to zero removes it
/// from the cart; decrementing a dish that is not in the cart is a no-op.
pub fn reducer(state: &mut AppState, mutation: Mutation) -> bool {
    match mutation {
        Mutation::ReceiveAddress(address) => {
            state.address = Some(address);
            true
        }

        Mutation::ReceiveCategories(categories) => {
            state.categories = categories;
            true
        }

        Mutation::ReceiveShops(shops) => {
            state.shops = shops;
            true
        }

        Mutation::ReceiveUserInfo(user) => {
            state.user_info = Some(user);
            true
        }

        Mutation::ResetUserInfo => state.user_info.take().is_some(),

        Mutation::ReceiveGoods(goods) => {
            state.goods = goods;
            true
        }

        Mutation::ReceiveRatings(ratings) => {
            state.ratings = ratings;
            true
        }

        Mutation::ReceiveInfo(info) => {
            state.info = Some(info);
            true
        }

        Mutation::IncrementFoodCount(food) => {
            let id = food.cart_id();
            match state.cart_foods.iter_mut().find(|item| item.id == id) {
                Some(item) => {
                    let count = item.count.saturating_add(1);
                    let changed = count != item.count;
                    item.count = count;
                    changed
                }
                None => {
                    state.cart_foods.push(CartFood::first_of(&food));
                    true
                }
            }
        }

        Mutation::DecrementFoodCount(food) => {
            let id = food.cart_id();
            let Some(pos) = state.cart_foods.iter().position(|item| item.id == id) else {
                return false;
            };

            let item = &mut state.cart_foods[pos];
            item.count = item.count.saturating_sub(1);
            if item.count == 0 {
                state.cart_foods.remove(pos);
            }
            true
        }

        Mutation::ClearCart => {
            let changed = !state.cart_foods.is_empty();
            state.cart_foods.clear();
            changed
        }

        Mutation::ReceiveSearchShops(shops) => {
            state.search_shops = shops;
            true
        }
    }
}
