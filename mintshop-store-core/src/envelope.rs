//! Response envelope returned by the remote service
//!
//! Every endpoint answers with `{ "code": <int>, "data": <payload> }`.
//! `code == 0` is success; anything else is a business failure whose payload
//! shape is undefined (the service usually sends `{ "code": 1, "msg": "..." }`).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The envelope code that signals success
pub const SUCCESS_CODE: i64 = 0;

/// Decoded response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(
        default,
        alias = "message",
        skip_serializing_if = "Option::is_none"
    )]
    pub msg: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            data: Some(data),
            msg: None,
        }
    }

    /// Failure envelope with a service message
    pub fn failure(code: i64, msg: impl Into<String>) -> Self {
        Self {
            code,
            data: None,
            msg: Some(msg.into()),
        }
    }

    /// Whether the service reported success
    #[inline]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

impl Envelope<Value> {
    /// Decode the payload into `T`.
    ///
    /// A missing `data` field decodes as JSON `null`, so payload types that
    /// accept null (`Option`, `()`) work for bodies like `{ "code": 0 }`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.unwrap_or(Value::Null))
    }
}
