pub mod openai;

use async_trait::async_trait;
use parcel_core::{Message, OracleError};

/// Trait for completion-service backends.
///
/// A backend performs exactly one request per call and classifies its own
/// failures. Retrying is layered on top by
/// [`RetryingBackend`](crate::retry::RetryingBackend).
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends `messages` and returns the completion text.
    ///
    /// `max_tokens` overrides the backend's configured limit for this call.
    async fn complete(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<String, OracleError>;
}
