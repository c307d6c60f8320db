//! Actions - remote operations that end in at most one commit
//!
//! Each action knows three things:
//! - its **target**, the state field it writes (completions are sequenced per target)
//! - the [`Request`] it sends, built from the state at dispatch time
//! - how a successful envelope's `data` is reshaped into its [`Mutation`]
//!
//! The dispatcher supplies the rest: spawning, envelope gating, ordering.

use mintshop_store::{Action as _, Envelope, TaskKey};
use serde::de::DeserializeOwned;

use crate::api::Request;
use crate::error::ActionError;
use crate::mutation::Mutation;
use crate::state::AppState;

/// Every remote operation the client performs
///
/// # Targets
/// | action                                   | target         | commits              |
/// |------------------------------------------|----------------|----------------------|
/// | `GetAddress`                             | `address`      | `ReceiveAddress`     |
/// | `GetCategories`                          | `categories`   | `ReceiveCategories`  |
/// | `GetShops`                               | `shops`        | `ReceiveShops`       |
/// | `SearchShops`                            | `search_shops` | `ReceiveSearchShops` |
/// | `LoginPwd`, `LoginSms`, `GetUserInfo`    | `user_info`    | `ReceiveUserInfo`    |
/// | `Logout`                                 | `user_info`    | `ResetUserInfo`      |
/// | `SendCode`                               | `sms_code`     | nothing              |
/// | `GetShopInfo`                            | `info`         | `ReceiveInfo`        |
/// | `GetShopRatings`                         | `ratings`      | `ReceiveRatings`     |
/// | `GetShopGoods`                           | `goods`        | `ReceiveGoods`       |
#[derive(mintshop_store::Action, Clone, Debug, PartialEq)]
pub enum Action {
    // ===== Home page =====
    GetAddress,
    GetCategories,
    GetShops,

    // ===== Search =====
    SearchShops { keyword: String },

    // ===== Session =====
    LoginPwd {
        name: String,
        pwd: String,
        captcha: String,
    },
    SendCode { phone: String },
    LoginSms { phone: String, code: String },
    GetUserInfo,
    Logout,

    // ===== Shop page =====
    GetShopInfo,
    GetShopRatings,
    GetShopGoods,
}

impl Action {
    /// State field this action writes
    pub fn target(&self) -> TaskKey {
        let name = match self {
            Action::GetAddress => "address",
            Action::GetCategories => "categories",
            Action::GetShops => "shops",
            Action::SearchShops { .. } => "search_shops",
            Action::LoginPwd { .. }
            | Action::LoginSms { .. }
            | Action::GetUserInfo
            | Action::Logout => "user_info",
            Action::SendCode { .. } => "sms_code",
            Action::GetShopInfo => "info",
            Action::GetShopRatings => "ratings",
            Action::GetShopGoods => "goods",
        };
        TaskKey::from(name)
    }

    /// Build the request, reading what it needs from the current state
    pub fn request(&self, state: &AppState) -> Request {
        match self {
            Action::GetAddress => Request::Address {
                geohash: state.geohash(),
            },
            Action::GetCategories => Request::Categories,
            Action::GetShops => Request::Shops {
                latitude: state.latitude,
                longitude: state.longitude,
            },
            Action::SearchShops { keyword } => Request::SearchShops {
                geohash: state.geohash(),
                keyword: keyword.clone(),
            },
            Action::LoginPwd { name, pwd, captcha } => Request::PwdLogin {
                name: name.clone(),
                pwd: pwd.clone(),
                captcha: captcha.clone(),
            },
            Action::SendCode { phone } => Request::SendCode {
                phone: phone.clone(),
            },
            Action::LoginSms { phone, code } => Request::SmsLogin {
                phone: phone.clone(),
                code: code.clone(),
            },
            Action::GetUserInfo => Request::UserInfo,
            Action::Logout => Request::Logout,
            Action::GetShopInfo => Request::ShopInfo,
            Action::GetShopRatings => Request::ShopRatings,
            Action::GetShopGoods => Request::ShopGoods,
        }
    }

    /// Gate an envelope and reshape its payload.
    ///
    /// - non-zero code: [`ActionError::Business`]
    /// - `data` of the wrong shape: [`ActionError::Payload`]
    /// - `Ok(None)`: success that commits nothing
    pub fn into_mutation(&self, envelope: Envelope) -> Result<Option<Mutation>, ActionError> {
        if !envelope.is_success() {
            return Err(ActionError::Business {
                code: envelope.code,
                message: envelope.msg.unwrap_or_default(),
            });
        }

        let mutation = match self {
            Action::GetAddress => Mutation::ReceiveAddress(self.decode(envelope)?),
            Action::GetCategories => Mutation::ReceiveCategories(self.decode(envelope)?),
            Action::GetShops => Mutation::ReceiveShops(self.decode(envelope)?),
            Action::SearchShops { .. } => Mutation::ReceiveSearchShops(self.decode(envelope)?),
            Action::LoginPwd { .. } | Action::LoginSms { .. } | Action::GetUserInfo => {
                Mutation::ReceiveUserInfo(self.decode(envelope)?)
            }
            Action::Logout => Mutation::ResetUserInfo,
            Action::SendCode { .. } => return Ok(None),
            Action::GetShopInfo => Mutation::ReceiveInfo(self.decode(envelope)?),
            Action::GetShopRatings => Mutation::ReceiveRatings(self.decode(envelope)?),
            Action::GetShopGoods => Mutation::ReceiveGoods(self.decode(envelope)?),
        };
        Ok(Some(mutation))
    }

    fn decode<T: DeserializeOwned>(&self, envelope: Envelope) -> Result<T, ActionError> {
        envelope.decode().map_err(|source| ActionError::Payload {
            action: self.name(),
            source,
        })
    }
}
