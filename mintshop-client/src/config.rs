//! Client configuration loaded from an optional JSON file

use std::fs;
use std::path::Path;

use mintshop_store::OrderingPolicy;
use serde::{Deserialize, Serialize};

use crate::api::API_PREFIX;
use crate::error::ConfigError;
use crate::state::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE};

/// Client configuration.
///
/// Every field has a default, so a config file only names what it changes:
///
/// ```json
/// { "base_url": "http://localhost:4000", "api_prefix": "" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme, host and port every request path is appended to
    pub base_url: String,
    /// Prefix of the service endpoints
    pub api_prefix: String,
    /// Prefix of the locally mocked shop endpoints
    pub mock_prefix: String,
    /// Seed coordinates
    pub latitude: f64,
    pub longitude: f64,
    /// How concurrent completions for the same state field are ordered
    pub ordering: OrderingPolicy,
    /// Entries kept in the commit log (0 disables it)
    pub commit_log_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_prefix: API_PREFIX.to_string(),
            mock_prefix: String::new(),
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            ordering: OrderingPolicy::default(),
            commit_log_capacity: 100,
        }
    }
}

impl ClientConfig {
    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
