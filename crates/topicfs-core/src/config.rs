//! Inbound configuration for a filesystem mount.
//!
//! The surrounding application is responsible for collecting and
//! validating credentials; this crate only consumes the finished struct.
//! `Options` deserializes from TOML with every field optional, falling
//! back to the documented defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsResult};

/// Validated configuration delivered once at filesystem construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Numeric identifier of the channel backing the whole mount.
    pub channel_id: i64,
    /// Application id issued by the remote service.
    pub app_id: i32,
    /// Application secret issued by the remote service.
    pub app_hash: String,
    /// Token for the secondary (elevated) session.
    pub bot_token: String,
    /// Account phone number used by the primary session.
    pub phone_number: String,
    /// Serialized session for reconnecting without a fresh login.
    pub session_string: String,
    /// Maximum number of in-flight remote calls.
    pub max_connections: usize,
    /// Throttle retries before the flood-wait error surfaces to the caller.
    pub max_retries: u32,
    /// Base delay for the throttle retry backoff.
    pub retry_base_delay_ms: u64,
    /// TTL applied to both the channel cache and the topic-listing cache.
    pub cache_ttl_seconds: u64,
    /// Test-server mode: the elevated handle aliases the primary session.
    pub test_server: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            channel_id: 0,
            app_id: 0,
            app_hash: String::new(),
            bot_token: String::new(),
            phone_number: String::new(),
            session_string: String::new(),
            max_connections: 10,
            max_retries: 10,
            retry_base_delay_ms: 250,
            cache_ttl_seconds: 60,
            test_server: false,
        }
    }
}

impl Options {
    /// Parse options from a TOML document.
    pub fn from_toml(text: &str) -> FsResult<Self> {
        toml::from_str(text).map_err(|err| FsError::InvalidConfig(err.to_string()))
    }

    /// Read and parse options from a TOML file.
    pub fn load(path: &Path) -> FsResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| FsError::InvalidConfig(format!("cannot read {}: {err}", path.display())))?;
        Self::from_toml(&text)
    }

    /// Reject configurations the filesystem cannot operate under.
    pub fn validate(&self) -> FsResult<()> {
        if self.channel_id == 0 {
            return Err(FsError::InvalidConfig("channel_id is required".to_string()));
        }
        if self.max_connections == 0 {
            return Err(FsError::InvalidConfig(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
