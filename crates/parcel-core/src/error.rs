use thiserror::Error;

/// A convenience `Result` alias using [`ParcelError`].
pub type ParcelResult<T> = Result<T, ParcelError>;

/// Top-level error type for failures that cannot be turned into a reply.
///
/// Oracle failures are not listed here: they always end up as a
/// [`OracleError::fallback_reply`] or a branch label.
#[derive(Error, Debug)]
pub enum ParcelError {
    /// The outbound HTTP client could not be built.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A terminal or file I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const RATE_LIMIT_MARKER: &str = "rate limit";
const CONTEXT_LENGTH_MARKER: &str = "maximum context length";

/// Classified failure of the completion service ("oracle").
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// No credential was configured, or the startup probe failed.
    #[error("oracle unavailable")]
    Unavailable,

    /// The upstream service throttled the request.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The prompt exceeded the model's context window. Never retried.
    #[error("context too long: {0}")]
    ContextTooLong(String),

    /// Anything else, carrying the upstream message.
    #[error("{0}")]
    Unexpected(String),
}

impl OracleError {
    /// Classifies a free-text failure message.
    ///
    /// This is pattern matching on upstream prose and is only a fallback;
    /// prefer [`OracleError::from_upstream`] when a status or error code is known.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains(RATE_LIMIT_MARKER) {
            OracleError::RateLimited(message)
        } else if lower.contains(CONTEXT_LENGTH_MARKER) {
            OracleError::ContextTooLong(message)
        } else {
            OracleError::Unexpected(message)
        }
    }

    /// Classifies an upstream failure, preferring structured signals
    /// (HTTP status, API error code) over the message text.
    pub fn from_upstream(status: Option<u16>, code: Option<&str>, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            Some("context_length_exceeded") => return OracleError::ContextTooLong(message),
            Some("rate_limit_exceeded") => return OracleError::RateLimited(message),
            _ => {}
        }
        if status == Some(429) {
            return OracleError::RateLimited(message);
        }
        Self::classify(message)
    }

    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, OracleError::ContextTooLong(_) | OracleError::Unavailable)
    }

    /// Whether the failure should end the conversation.
    pub fn ends_conversation(&self) -> bool {
        matches!(self, OracleError::ContextTooLong(_))
    }

    /// The sentence shown to the user in place of an oracle answer.
    pub fn fallback_reply(&self) -> String {
        match self {
            OracleError::Unavailable => {
                "Sorry, there's an issue with our AI service at the moment. Please try again later."
                    .to_string()
            }
            OracleError::RateLimited(_) => {
                "We're experiencing high demand right now. Please try again in a moment."
                    .to_string()
            }
            OracleError::ContextTooLong(_) => "Token limit reached. Ending conversation.".to_string(),
            OracleError::Unexpected(msg) => format!("An unexpected error occurred: {msg}"),
        }
    }
}
