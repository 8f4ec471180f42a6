use anyhow::Context;
use parcel_dialogue::DialogueConfig;
use parcel_gateway::{BotProfile, GatewayConfig};
use parcel_oracle::OracleConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Contents of `parcel.toml`. Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ParcelConfig {
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub dialogue: DialogueConfig,
    #[serde(default)]
    pub server: GatewayConfig,
    #[serde(default)]
    pub bot: BotProfile,
}

impl ParcelConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use parcel_dialogue::DecisionContext;
    use parcel_oracle::OracleProvider;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ParcelConfig::load(&tmp.path().join("parcel.toml"))
            .await
            .unwrap();
        assert_eq!(config.server.port, 5328);
        assert_eq!(config.oracle.model_id, "gpt-3.5-turbo");
        assert_eq!(config.dialogue.decision_context, DecisionContext::Isolated);
        assert_eq!(config.bot.name, "iGain Package Tracker");
    }

    #[tokio::test]
    async fn partial_file_overrides_sections() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("parcel.toml");
        std::fs::write(
            &path,
            r#"
[oracle]
provider = "groq"
model_id = "llama-3.1-8b-instant"

[oracle.retry_policy]
max_attempts = 2

[dialogue]
decision_context = "transcript"

[server]
port = 8080
max_sessions = 50
"#,
        )
        .unwrap();

        let config = ParcelConfig::load(&path).await.unwrap();
        assert_eq!(config.oracle.provider, OracleProvider::Groq);
        assert_eq!(config.oracle.retry_policy.max_attempts, 2);
        assert_eq!(config.oracle.retry_policy.backoff_max_ms, 60_000);
        assert_eq!(config.dialogue.decision_context, DecisionContext::Transcript);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.max_sessions, 50);
        assert_eq!(config.server.session_idle_secs, 3600);
        assert_eq!(config.bot.capabilities.len(), 3);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("parcel.toml");
        std::fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();

        let err = ParcelConfig::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
