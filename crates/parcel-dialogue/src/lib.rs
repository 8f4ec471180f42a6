//! The package-tracking dialogue.
//!
//! A [`Session`] holds the current [`DialogueState`] and the transcript.
//! [`DialogueEngine::process_input`] advances a session by one user turn,
//! deciding the next state deterministically (tracking-number extraction,
//! literal keywords) or by asking the oracle through the [`BranchDecider`].

pub mod branch;
pub mod decider;
pub mod engine;
pub mod extract;
pub mod prompts;
pub mod registry;
pub mod replies;
pub mod session;
pub mod state;

pub use decider::{BranchDecider, Decision, DecisionContext};
pub use engine::{DialogueConfig, DialogueEngine};
pub use extract::{extract_tracking_number, generate_confirmation_number};
pub use registry::{SessionLimits, SessionRegistry, SharedSession, DEFAULT_SESSION_ID};
pub use session::{Session, DEFAULT_SYSTEM_PROMPT};
pub use state::DialogueState;
