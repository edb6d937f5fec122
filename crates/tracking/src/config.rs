//! Client configuration.
//!
//! Every field has a default, so a configuration can be built from a partial
//! JSON or TOML document (`{"cache_size": 50}`) or from
//! [`TrackMlConfig::default`] plus struct-update syntax.

use serde::{Deserialize, Serialize};

use crate::{ModelId, TrackingError};

/// Default address of the tracking server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

/// Default fallback charset for response bodies.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Default number of deferred experiments held before an automatic flush.
pub const DEFAULT_CACHE_SIZE: usize = 20;

/// Settings shared by the client facade and its transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackMlConfig {
    /// Root URL of the tracking server. API paths are appended to it.
    pub base_url: String,

    /// Charset used to decode response bodies when the server does not name
    /// one in its `Content-Type` header.
    pub encoding: String,

    /// Number of deferred experiments that triggers an automatic flush.
    pub cache_size: usize,

    /// Initial default model id, as if [`crate::TrackMl::set_model`] had been
    /// called right after construction.
    pub model_id: Option<ModelId>,
}

impl Default for TrackMlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
            cache_size: DEFAULT_CACHE_SIZE,
            model_id: None,
        }
    }
}

impl TrackMlConfig {
    /// Creates the default configuration pointed at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Checks the settings the client depends on.
    ///
    /// URL syntax is checked by the transport, which owns URL parsing.
    pub fn validate(&self) -> Result<(), TrackingError> {
        if self.base_url.trim().is_empty() {
            return Err(TrackingError::configuration("base_url must not be empty"));
        }
        if self.encoding.trim().is_empty() {
            return Err(TrackingError::configuration("encoding must not be empty"));
        }
        if self.cache_size == 0 {
            return Err(TrackingError::configuration(
                "cache_size must be at least 1",
            ));
        }
        Ok(())
    }
}
