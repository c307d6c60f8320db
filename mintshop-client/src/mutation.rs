//! Mutations - the closed set of state transitions
//!
//! One variant per transition, each carrying its own payload. The reducer
//! matches them exhaustively, so there is no such thing as an unknown
//! mutation name at runtime.

use mintshop_store::MutationSummary;

use crate::state::{Address, Category, Food, GoodsCategory, Rating, Shop, ShopInfo, UserInfo};

/// Every way the application state can change
///
/// # Names (derived, snake_case):
/// `receive_address`, `receive_categories`, `receive_shops`, `receive_user_info`,
/// `reset_user_info`, `receive_goods`, `receive_ratings`, `receive_info`,
/// `increment_food_count`, `decrement_food_count`, `clear_cart`,
/// `receive_search_shops`
#[derive(mintshop_store::Mutation, Clone, Debug, PartialEq)]
pub enum Mutation {
    // ===== Home page =====
    ReceiveAddress(Address),
    ReceiveCategories(Vec<Category>),
    ReceiveShops(Vec<Shop>),

    // ===== Session =====
    ReceiveUserInfo(UserInfo),
    ResetUserInfo,

    // ===== Shop page =====
    ReceiveGoods(Vec<GoodsCategory>),
    ReceiveRatings(Vec<Rating>),
    ReceiveInfo(ShopInfo),

    // ===== Cart =====
    IncrementFoodCount(Food),
    DecrementFoodCount(Food),
    ClearCart,

    // ===== Search =====
    ReceiveSearchShops(Vec<Shop>),
}

/// Lists are summarized by length in the commit log
impl MutationSummary for Mutation {
    fn summary(&self) -> String {
        match self {
            Mutation::ReceiveAddress(address) => format!("ReceiveAddress({:?})", address.name),
            Mutation::ReceiveCategories(list) => format!("ReceiveCategories({} items)", list.len()),
            Mutation::ReceiveShops(list) => format!("ReceiveShops({} items)", list.len()),
            Mutation::ReceiveSearchShops(list) => {
                format!("ReceiveSearchShops({} items)", list.len())
            }
            Mutation::ReceiveUserInfo(user) => format!("ReceiveUserInfo({:?})", user.id),
            Mutation::ReceiveGoods(list) => format!("ReceiveGoods({} items)", list.len()),
            Mutation::ReceiveRatings(list) => format!("ReceiveRatings({} items)", list.len()),
            Mutation::ReceiveInfo(info) => format!("ReceiveInfo({:?})", info.name),
            Mutation::IncrementFoodCount(food) => format!("IncrementFoodCount({:?})", food.name),
            Mutation::DecrementFoodCount(food) => format!("DecrementFoodCount({:?})", food.name),
            Mutation::ResetUserInfo | Mutation::ClearCart => format!("{:?}", self),
        }
    }
}
