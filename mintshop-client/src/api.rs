//! Remote API surface
//!
//! [`Request`] is the endpoint table: each variant binds one path, one
//! parameter set and one method. Shaping parameters (packing coordinates,
//! putting the geohash into the path) is all it does.
//!
//! | request       | method | path                 | params                 |
//! |---------------|--------|----------------------|------------------------|
//! | `Address`     | GET    | `/position/{geohash}`| -                      |
//! | `Categories`  | GET    | `/index_category`    | -                      |
//! | `Shops`       | GET    | `/shops`             | latitude, longitude    |
//! | `SearchShops` | GET    | `/search_shops`      | geohash, keyword       |
//! | `PwdLogin`    | POST   | `/login_pwd`         | name, pwd, captcha     |
//! | `SendCode`    | GET    | `/sendcode`          | phone                  |
//! | `SmsLogin`    | POST   | `/login_sms`         | phone, code            |
//! | `UserInfo`    | GET    | `/userinfo`          | -                      |
//! | `Logout`      | GET    | `/logout`            | -                      |
//! | `ShopInfo`    | GET    | `/info`              | - (local mock)         |
//! | `ShopRatings` | GET    | `/ratings`           | - (local mock)         |
//! | `ShopGoods`   | GET    | `/goods`             | - (local mock)         |
//!
//! Service endpoints live under the API prefix (`/api` behind the dev proxy);
//! the shop endpoints are served by a local mock and use their own prefix.

use mintshop_store::{Envelope, Method, Params, Transport, TransportError};

/// Default prefix for service endpoints
pub const API_PREFIX: &str = "/api";

/// One remote operation with its parameters
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Address { geohash: String },
    Categories,
    Shops { latitude: f64, longitude: f64 },
    SearchShops { geohash: String, keyword: String },
    PwdLogin { name: String, pwd: String, captcha: String },
    SendCode { phone: String },
    SmsLogin { phone: String, code: String },
    UserInfo,
    Logout,
    ShopInfo,
    ShopRatings,
    ShopGoods,
}

impl Request {
    /// Path relative to the endpoint prefix
    pub fn path(&self) -> String {
        match self {
            Request::Address { geohash } => format!("/position/{}", geohash),
            Request::Categories => "/index_category".into(),
            Request::Shops { .. } => "/shops".into(),
            Request::SearchShops { .. } => "/search_shops".into(),
            Request::PwdLogin { .. } => "/login_pwd".into(),
            Request::SendCode { .. } => "/sendcode".into(),
            Request::SmsLogin { .. } => "/login_sms".into(),
            Request::UserInfo => "/userinfo".into(),
            Request::Logout => "/logout".into(),
            Request::ShopInfo => "/info".into(),
            Request::ShopRatings => "/ratings".into(),
            Request::ShopGoods => "/goods".into(),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Request::PwdLogin { .. } | Request::SmsLogin { .. } => Method::Post,
            _ => Method::Get,
        }
    }

    pub fn params(&self) -> Params {
        match self {
            Request::Shops {
                latitude,
                longitude,
            } => Params::new()
                .with("latitude", latitude)
                .with("longitude", longitude),
            Request::SearchShops { geohash, keyword } => Params::new()
                .with("geohash", geohash)
                .with("keyword", keyword),
            Request::PwdLogin { name, pwd, captcha } => Params::new()
                .with("name", name)
                .with("pwd", pwd)
                .with("captcha", captcha),
            Request::SendCode { phone } => Params::new().with("phone", phone),
            Request::SmsLogin { phone, code } => {
                Params::new().with("phone", phone).with("code", code)
            }
            Request::Address { .. }
            | Request::Categories
            | Request::UserInfo
            | Request::Logout
            | Request::ShopInfo
            | Request::ShopRatings
            | Request::ShopGoods => Params::new(),
        }
    }

    /// Served by the local mock rather than the service
    pub fn is_mock(&self) -> bool {
        matches!(
            self,
            Request::ShopInfo | Request::ShopRatings | Request::ShopGoods
        )
    }
}

/// Binds the endpoint table to a transport
#[derive(Debug)]
pub struct Api<T> {
    transport: T,
    api_prefix: String,
    mock_prefix: String,
}

impl<T: Transport> Api<T> {
    pub fn new(transport: T, api_prefix: impl Into<String>, mock_prefix: impl Into<String>) -> Self {
        Self {
            transport,
            api_prefix: api_prefix.into(),
            mock_prefix: mock_prefix.into(),
        }
    }

    /// Full path of a request, prefix included
    pub fn path_for(&self, request: &Request) -> String {
        let prefix = if request.is_mock() {
            &self.mock_prefix
        } else {
            &self.api_prefix
        };
        format!("{}{}", prefix, request.path())
    }

    /// Perform the call and return the decoded envelope
    pub async fn call(&self, request: &Request) -> Result<Envelope, TransportError> {
        let path = self.path_for(request);
        self.transport
            .send(&path, &request.params(), request.method())
            .await
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
