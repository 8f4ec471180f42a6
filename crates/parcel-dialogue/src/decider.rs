use parcel_core::{Message, OracleError};
use parcel_oracle::OracleClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// What the oracle sees besides the decision prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionContext {
    /// The prompt alone, as a single system message.
    #[default]
    Isolated,
    /// The session transcript followed by the prompt.
    Transcript,
}

/// The outcome of one branch decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    label: String,
    failure: Option<OracleError>,
}

impl Decision {
    /// The normalized label. When the oracle failed this is the normalized
    /// fallback sentence, which matches no branch.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn failure(&self) -> Option<&OracleError> {
        self.failure.as_ref()
    }

    /// True when the oracle reported context exhaustion.
    pub fn ends_conversation(&self) -> bool {
        self.failure
            .as_ref()
            .is_some_and(OracleError::ends_conversation)
    }
}

/// Trim and lowercase an oracle answer.
pub fn normalize_label(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Asks the oracle to pick a branch.
pub struct BranchDecider {
    oracle: Arc<OracleClient>,
    context: DecisionContext,
}

impl BranchDecider {
    pub fn new(oracle: Arc<OracleClient>, context: DecisionContext) -> Self {
        Self { oracle, context }
    }

    pub fn oracle(&self) -> &OracleClient {
        &self.oracle
    }

    fn build_messages(&self, prompt: &str, transcript: &[Message]) -> Vec<Message> {
        match self.context {
            DecisionContext::Isolated => vec![Message::system(prompt)],
            DecisionContext::Transcript => {
                let mut messages = transcript.to_vec();
                messages.push(Message::system(prompt));
                messages
            }
        }
    }

    /// Sends `prompt` and normalizes the answer. Oracle failures never escape:
    /// the fallback sentence becomes the label.
    pub async fn decide(&self, prompt: &str, transcript: &[Message]) -> Decision {
        let messages = self.build_messages(prompt, transcript);
        match self.oracle.complete(&messages).await {
            Ok(text) => {
                let label = normalize_label(&text);
                debug!(label = %label, "Oracle decided branch");
                Decision {
                    label,
                    failure: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Oracle decision failed, using fallback text as label");
                Decision {
                    label: normalize_label(&e.fallback_reply()),
                    failure: Some(e),
                }
            }
        }
    }
}
