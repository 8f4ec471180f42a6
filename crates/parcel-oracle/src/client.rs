use crate::backends::openai::OpenAiBackend;
use crate::backends::CompletionBackend;
use crate::config::OracleConfig;
use crate::retry::{RetryPolicy, RetryingBackend};
use parcel_core::{Message, OracleError};
use tracing::{error, info, warn};

const PROBE_MAX_TOKENS: u32 = 5;

/// Oracle client: an optional backend wrapped in the retry loop.
///
/// A client without a backend is *unavailable*: every call short-circuits to
/// [`OracleError::Unavailable`] without touching the network.
pub struct OracleClient {
    backend: Option<RetryingBackend>,
}

impl OracleClient {
    /// Builds the client from configuration. A missing credential (or an HTTP
    /// client that cannot be constructed) yields an unavailable client.
    pub fn new(config: &OracleConfig) -> Self {
        let Some(api_key) = config.resolve_api_key() else {
            warn!(env = %config.api_key_env, "No oracle API key configured, oracle unavailable");
            return Self::unavailable();
        };

        match OpenAiBackend::new(config.clone(), api_key) {
            Ok(backend) => Self::from_backend(Box::new(backend), config.retry_policy.clone()),
            Err(e) => {
                error!(error = %e, "Failed to build oracle HTTP client");
                Self::unavailable()
            }
        }
    }

    /// Create from a pre-built backend (for custom providers and tests).
    pub fn from_backend(backend: Box<dyn CompletionBackend>, policy: RetryPolicy) -> Self {
        Self {
            backend: Some(RetryingBackend::new(backend, policy)),
        }
    }

    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Sends one short, un-retried probe request.
    pub async fn verify(&self) -> Result<(), OracleError> {
        let backend = self.backend.as_ref().ok_or(OracleError::Unavailable)?;
        let probe = [Message::user("Hello")];
        backend
            .inner()
            .complete(&probe, Some(PROBE_MAX_TOKENS))
            .await
            .map(|_| ())
    }

    /// Runs [`verify`](Self::verify) and demotes the client to unavailable if
    /// the probe fails.
    pub async fn verified(self) -> Self {
        if !self.is_available() {
            return self;
        }
        match self.verify().await {
            Ok(()) => {
                info!("Oracle connection verified");
                self
            }
            Err(e) => {
                error!(error = %e, "Oracle verification failed, oracle unavailable");
                Self::unavailable()
            }
        }
    }

    /// Completion with retry and backoff.
    pub async fn complete(&self, messages: &[Message]) -> Result<String, OracleError> {
        match &self.backend {
            Some(backend) => backend.complete(messages, None).await,
            None => Err(OracleError::Unavailable),
        }
    }

    /// Completion text, or the user-facing fallback sentence on failure.
    pub async fn respond(&self, messages: &[Message]) -> String {
        match self.complete(messages).await {
            Ok(text) => text,
            Err(e) => {
                if !matches!(e, OracleError::Unavailable) {
                    error!(error = %e, "Error generating response after retries");
                }
                e.fallback_reply()
            }
        }
    }
}
