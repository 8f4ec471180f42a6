use crate::state::DialogueState;
use chrono::{DateTime, Utc};
use parcel_core::Message;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persona given to the oracle as the first transcript entry.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a customer support chatbot specialized in tracking lost packages. \
Your task is to ask for tracking numbers or order IDs, validate the data, \
provide package status, and offer creative options like real-time updates, \
filing a support ticket, or escalating issues. Keep your tone friendly and clear.";

/// One conversation: the current state plus the transcript.
///
/// A fresh or reset session is in [`DialogueState::Greeting`] with a
/// transcript holding only the system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub state: DialogueState,
    pub transcript: Vec<Message>,
    system_prompt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4(), DEFAULT_SYSTEM_PROMPT)
    }

    pub fn with_id(id: Uuid, system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        let now = Utc::now();
        Self {
            id,
            state: DialogueState::Greeting,
            transcript: vec![Message::system(system_prompt.clone())],
            system_prompt,
            created_at: now,
            updated_at: now,
        }
    }

    /// Back to [`DialogueState::Greeting`] with only the system prompt.
    pub fn reset(&mut self) {
        self.state = DialogueState::Greeting;
        self.transcript.clear();
        self.transcript.push(Message::system(self.system_prompt.clone()));
        self.updated_at = Utc::now();
    }

    pub fn add_message(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.transcript.push(message);
    }

    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
