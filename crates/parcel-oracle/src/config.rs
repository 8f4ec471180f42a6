use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Completion providers. All of them speak the OpenAI chat-completions API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleProvider {
    #[default]
    OpenAi,
    OpenRouter,
    /// Groq cloud inference, OpenAI-compatible API.
    Groq,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub provider: OracleProvider,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Inline credential. Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Per-attempt request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_verify_on_startup")]
    pub verify_on_startup: bool,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
}

fn default_model_id() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_verify_on_startup() -> bool {
    true
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: OracleProvider::default(),
            model_id: default_model_id(),
            api_key: None,
            api_key_env: default_api_key_env(),
            api_base_url: None,
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
            verify_on_startup: default_verify_on_startup(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl OracleConfig {
    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url
        } else {
            match self.provider {
                OracleProvider::OpenAi => "https://api.openai.com",
                OracleProvider::OpenRouter => "https://openrouter.ai/api",
                OracleProvider::Groq => "https://api.groq.com/openai",
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The credential to use, if any. Blank values count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}
