use parcel_dialogue::SessionLimits;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Listener and request limits for the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Longest accepted message, in characters.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Most conversations held in memory at once.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Seconds a conversation may sit untouched before it is dropped.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5328
}

fn default_max_message_length() -> usize {
    100_000
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_session_idle_secs() -> u64 {
    3600
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_message_length: default_max_message_length(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl GatewayConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            max_sessions: self.max_sessions,
            idle_ttl: Duration::from_secs(self.session_idle_secs),
        }
    }
}

/// Name and capabilities shown by the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotProfile {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
}

fn default_name() -> String {
    "iGain Package Tracker".to_string()
}

fn default_capabilities() -> Vec<String> {
    vec![
        "Track packages with tracking numbers".to_string(),
        "Provide real-time updates".to_string(),
        "Help file support tickets".to_string(),
    ]
}

impl Default for BotProfile {
    fn default() -> Self {
        Self {
            name: default_name(),
            capabilities: default_capabilities(),
        }
    }
}
