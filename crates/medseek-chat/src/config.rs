use medseek_types::ClientError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::reconnect::ReconnectPolicy;

/// How a locally sent message reaches the message list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EchoPolicy {
    /// Append the message as soon as it is sent and drop the server's echo
    Optimistic,
    /// Wait for the server to broadcast the message back
    #[default]
    ServerEcho,
}

/// Client configuration, supplied to `start_app` as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix of the REST endpoints
    pub api_base: String,
    /// Path of the socket endpoint on the page host
    pub ws_path: String,
    pub echo_policy: EchoPolicy,
    pub reconnect: ReconnectPolicy,
    /// Give up on a socket that has not opened after this long
    pub connect_timeout_ms: u32,
    pub log_level: String,
    /// Id of the element the app renders into
    pub root_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "/api".to_string(),
            ws_path: "/ws".to_string(),
            echo_policy: EchoPolicy::default(),
            reconnect: ReconnectPolicy::default(),
            connect_timeout_ms: 10_000,
            log_level: "info".to_string(),
            root_id: "app".to_string(),
        }
    }
}

impl ClientConfig {
    /// Parse an optional JSON document; `None` or blank input yields the defaults
    pub fn from_json(json: Option<&str>) -> Result<Self, ClientError> {
        let config = match json.map(str::trim) {
            None | Some("") => Self::default(),
            Some(text) => serde_json::from_str::<Self>(text)
                .map_err(|e| ClientError::Config(e.to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ClientError> {
        self.level()?;
        if self.reconnect.max_delay_ms < self.reconnect.base_delay_ms {
            return Err(ClientError::Config(format!(
                "reconnect.max_delay_ms ({}) is below reconnect.base_delay_ms ({})",
                self.reconnect.max_delay_ms, self.reconnect.base_delay_ms
            )));
        }
        if !self.ws_path.starts_with('/') {
            return Err(ClientError::Config(format!(
                "ws_path must start with '/': {}",
                self.ws_path
            )));
        }
        Ok(())
    }

    pub fn level(&self) -> Result<log::Level, ClientError> {
        log::Level::from_str(&self.log_level)
            .map_err(|_| ClientError::Config(format!("unknown log level: {}", self.log_level)))
    }
}
