//! Application state - single source of truth
//!
//! Presentation code only ever sees `&AppState`. Every field is written by
//! the reducer in response to a [`Mutation`](crate::mutation::Mutation); the
//! dispatcher and the getters only read.
//!
//! The wire entities keep the fields the client works with as typed members
//! and carry everything else the service sends in a flattened `extra` map, so
//! a received record round-trips unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default seed location (latitude)
pub const DEFAULT_LATITUDE: f64 = 40.10038;
/// Default seed location (longitude)
pub const DEFAULT_LONGITUDE: f64 = 116.36867;

/// Address resolved from the current coordinates
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub geohash: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Food category shown on the home page carousel
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shop summary (home page list and search results)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub recent_order_num: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The logged-in user
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dish on the shop menu
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub old_price: Option<f64>,
    #[serde(default)]
    pub sell_count: i64,
    #[serde(default)]
    pub icon: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Food {
    /// Identity of this dish in the cart.
    ///
    /// The menu payload does not always carry an id, so the name is the
    /// fallback key.
    pub fn cart_id(&self) -> String {
        match self.extra.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => self.name.clone(),
        }
    }
}

/// A menu section and its dishes
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GoodsCategory {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: i64,
    #[serde(default)]
    pub foods: Vec<Food>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A customer rating; `rate_type` 0 is positive, 1 negative
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(default)]
    pub username: String,
    pub rate_type: u8,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shop header details
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub min_price: f64,
    #[serde(default)]
    pub delivery_price: f64,
    #[serde(default)]
    pub score: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A line in the shopping cart
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartFood {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub count: u32,
}

impl CartFood {
    /// First unit of `food` in the cart
    pub fn first_of(food: &Food) -> Self {
        Self {
            id: food.cart_id(),
            name: food.name.clone(),
            price: food.price,
            count: 1,
        }
    }
}

/// Application state - everything synchronized from the service
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppState {
    /// Seed coordinates used to look up the address and nearby shops
    pub latitude: f64,
    pub longitude: f64,

    /// Address for the coordinates (None = not yet fetched)
    pub address: Option<Address>,

    pub categories: Vec<Category>,

    pub shops: Vec<Shop>,

    /// Result of the last shop search
    pub search_shops: Vec<Shop>,

    /// Logged-in user (None = anonymous)
    pub user_info: Option<UserInfo>,

    pub goods: Vec<GoodsCategory>,

    pub ratings: Vec<Rating>,

    pub info: Option<ShopInfo>,

    pub cart_foods: Vec<CartFood>,
}

impl AppState {
    /// Create state seeded with the given coordinates
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            address: None,
            categories: Vec::new(),
            shops: Vec::new(),
            search_shops: Vec::new(),
            user_info: None,
            goods: Vec::new(),
            ratings: Vec::new(),
            info: None,
            cart_foods: Vec::new(),
        }
    }

    /// `"{latitude},{longitude}"`, the geohash form the service expects
    pub fn geohash(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// Cart line for a dish, if it is in the cart
    pub fn cart_item(&self, food: &Food) -> Option<&CartFood> {
        let id = food.cart_id();
        self.cart_foods.iter().find(|item| item.id == id)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_state_is_empty() {
        let state = AppState::default();
        assert_eq!(state.geohash(), "40.10038,116.36867");
        assert!(state.address.is_none());
        assert!(state.categories.is_empty());
        assert!(state.user_info.is_none());
        assert!(state.cart_foods.is_empty());
    }

    #[test]
    fn test_shop_keeps_unknown_fields() {
        let raw = json!({
            "id": 1,
            "name": "Noodle House",
            "rating": 4.7,
            "recent_order_num": 106,
            "float_delivery_fee": 5,
            "supports": [{"icon_name": "保"}]
        });
        let shop: Shop = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(shop.name, "Noodle House");
        assert_eq!(shop.extra["float_delivery_fee"], json!(5));
        assert_eq!(serde_json::to_value(&shop).unwrap(), raw);
    }

    #[test]
    fn test_rating_wire_names() {
        let rating: Rating =
            serde_json::from_value(json!({"username": "3******c", "rateType": 1, "score": 3}))
                .unwrap();
        assert_eq!(rating.rate_type, 1);
        assert_eq!(rating.score, 3.0);
    }

    #[test]
    fn test_user_info_id() {
        let user: UserInfo =
            serde_json::from_value(json!({"_id": "5b6", "phone": "13716962779"})).unwrap();
        assert_eq!(user.id, "5b6");
        assert_eq!(user.phone.as_deref(), Some("13716962779"));
        assert_eq!(user.name, None);
    }

    #[test]
    fn test_food_cart_id_fallback() {
        let named: Food = serde_json::from_value(json!({"name": "皮蛋瘦肉粥", "price": 10})).unwrap();
        assert_eq!(named.cart_id(), "皮蛋瘦肉粥");

        let with_id: Food =
            serde_json::from_value(json!({"id": 7, "name": "扁豆焖面", "price": 14})).unwrap();
        assert_eq!(with_id.cart_id(), "7");
    }
}
