use crate::branch::{AlternativeInfoBranch, ConfirmedBranch, FinalizingBranch, TrackingBranch};
use crate::decider::{BranchDecider, Decision, DecisionContext};
use crate::extract::{extract_tracking_number, generate_confirmation_number};
use crate::session::{Session, DEFAULT_SYSTEM_PROMPT};
use crate::state::DialogueState;
use crate::{prompts, replies};
use parcel_core::Message;
use parcel_oracle::OracleClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    #[serde(default)]
    pub decision_context: DecisionContext,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            decision_context: DecisionContext::default(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// The next state and the reply that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Transition {
    next: DialogueState,
    reply: String,
}

impl Transition {
    fn to(next: DialogueState, reply: impl Into<String>) -> Self {
        Self {
            next,
            reply: reply.into(),
        }
    }
}

fn is_keyword(input: &str, keyword: &str) -> bool {
    input.trim().eq_ignore_ascii_case(keyword)
}

/// Context exhaustion ends the conversation regardless of state.
fn ended_by_oracle(decision: &Decision) -> Option<Transition> {
    decision
        .failure()
        .filter(|e| e.ends_conversation())
        .map(|e| Transition::to(DialogueState::End, e.fallback_reply()))
}

/// Drives sessions through the package-tracking dialogue.
pub struct DialogueEngine {
    decider: BranchDecider,
    system_prompt: String,
}

impl DialogueEngine {
    pub fn new(oracle: Arc<OracleClient>, config: DialogueConfig) -> Self {
        Self {
            decider: BranchDecider::new(oracle, config.decision_context),
            system_prompt: config.system_prompt,
        }
    }

    pub fn oracle(&self) -> &OracleClient {
        self.decider.oracle()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// A fresh session using this engine's system prompt.
    pub fn new_session(&self) -> Session {
        Session::with_id(uuid::Uuid::new_v4(), self.system_prompt.clone())
    }

    /// Resets `session` and enters the greeting. Returns the greeting.
    pub fn initial_greeting(&self, session: &mut Session) -> String {
        session.reset();
        let transition = greeting();
        apply(session, transition)
    }

    /// Advances `session` by one user turn and returns the reply.
    pub async fn process_input(&self, session: &mut Session, input: &str) -> String {
        session.add_message(Message::user(input));

        let transition = match session.state {
            DialogueState::Greeting => greeting(),
            DialogueState::AwaitingTracking => self.awaiting_tracking(session, input).await,
            DialogueState::AwaitingAlternativeInfo => {
                self.awaiting_alternative_info(session, input).await
            }
            DialogueState::TrackingConfirmed => self.tracking_confirmed(session, input).await,
            DialogueState::FilingTicket => filing_ticket(input),
            DialogueState::Finalizing => self.finalizing(session, input).await,
            DialogueState::End => return replies::CONVERSATION_ENDED.to_string(),
        };

        debug!(
            session_id = %session.id,
            from = %session.state,
            to = %transition.next,
            "State transition"
        );
        apply(session, transition)
    }

    async fn awaiting_tracking(&self, session: &Session, input: &str) -> Transition {
        if is_keyword(input, "restart") {
            return greeting();
        }
        if let Some(number) = extract_tracking_number(input) {
            info!(session_id = %session.id, "Tracking number extracted");
            return Transition::to(
                DialogueState::TrackingConfirmed,
                replies::tracking_confirmed(number),
            );
        }

        let decision = self
            .decider
            .decide(&prompts::awaiting_tracking(input), &session.transcript)
            .await;
        if let Some(ended) = ended_by_oracle(&decision) {
            return ended;
        }

        let stay = DialogueState::AwaitingTracking;
        match TrackingBranch::from_label(decision.label()) {
            TrackingBranch::Restart => greeting(),
            TrackingBranch::AlternativeInfo => Transition::to(
                DialogueState::AwaitingAlternativeInfo,
                replies::ASK_ALTERNATIVE_INFO,
            ),
            TrackingBranch::InvalidTracking => Transition::to(stay, replies::INVALID_TRACKING_NUMBER),
            TrackingBranch::Invalid => Transition::to(stay, replies::INVALID_INPUT),
            TrackingBranch::Unrecognized => Transition::to(stay, replies::TRACKING_UNRECOGNIZED),
        }
    }

    async fn awaiting_alternative_info(&self, session: &Session, input: &str) -> Transition {
        if is_keyword(input, "restart") {
            return greeting();
        }

        let decision = self
            .decider
            .decide(&prompts::awaiting_alternative_info(input), &session.transcript)
            .await;
        if let Some(ended) = ended_by_oracle(&decision) {
            return ended;
        }

        let stay = DialogueState::AwaitingAlternativeInfo;
        match AlternativeInfoBranch::from_label(decision.label()) {
            AlternativeInfoBranch::Restart => greeting(),
            AlternativeInfoBranch::ValidAlternative => {
                let number = generate_confirmation_number();
                Transition::to(
                    DialogueState::TrackingConfirmed,
                    replies::tracking_confirmed(&number),
                )
            }
            AlternativeInfoBranch::Invalid => Transition::to(stay, replies::INVALID_INPUT),
            AlternativeInfoBranch::Unrecognized => {
                Transition::to(stay, replies::ALTERNATIVE_INFO_UNRECOGNIZED)
            }
        }
    }

    async fn tracking_confirmed(&self, session: &Session, input: &str) -> Transition {
        if is_keyword(input, "restart") {
            return greeting();
        }

        let decision = self
            .decider
            .decide(&prompts::tracking_confirmed(input), &session.transcript)
            .await;
        if let Some(ended) = ended_by_oracle(&decision) {
            return ended;
        }

        let stay = DialogueState::TrackingConfirmed;
        match ConfirmedBranch::from_label(decision.label()) {
            ConfirmedBranch::Restart => greeting(),
            ConfirmedBranch::FilingTicket => {
                Transition::to(DialogueState::FilingTicket, replies::ASK_TICKET_DETAILS)
            }
            ConfirmedBranch::Finalizing => {
                Transition::to(DialogueState::Finalizing, replies::UPDATES_SCHEDULED)
            }
            ConfirmedBranch::Invalid => Transition::to(stay, replies::INVALID_INPUT),
            ConfirmedBranch::Unrecognized => Transition::to(stay, replies::CONFIRMED_UNRECOGNIZED),
        }
    }

    async fn finalizing(&self, session: &Session, input: &str) -> Transition {
        if is_keyword(input, "restart") {
            return greeting();
        }
        if is_keyword(input, "no") {
            return Transition::to(DialogueState::End, replies::GOODBYE);
        }
        if is_keyword(input, "yes") {
            return Transition::to(DialogueState::TrackingConfirmed, replies::CONTINUE);
        }

        let decision = self
            .decider
            .decide(&prompts::finalizing(input), &session.transcript)
            .await;
        if let Some(ended) = ended_by_oracle(&decision) {
            return ended;
        }

        match FinalizingBranch::from_label(decision.label()) {
            FinalizingBranch::Restart => greeting(),
            FinalizingBranch::Continue => {
                Transition::to(DialogueState::TrackingConfirmed, replies::CONTINUE)
            }
            FinalizingBranch::End => Transition::to(DialogueState::End, replies::GOODBYE),
            FinalizingBranch::Unrecognized => {
                Transition::to(DialogueState::Finalizing, replies::INVALID_INPUT)
            }
        }
    }
}

/// Entering the greeting always lands in [`DialogueState::AwaitingTracking`].
fn greeting() -> Transition {
    Transition::to(DialogueState::AwaitingTracking, replies::GREETING)
}

fn filing_ticket(input: &str) -> Transition {
    if is_keyword(input, "restart") {
        return greeting();
    }
    Transition::to(DialogueState::Finalizing, replies::ticket_filed(input))
}

fn apply(session: &mut Session, transition: Transition) -> String {
    session.state = transition.next;
    session.add_message(Message::assistant(transition.reply.clone()));
    transition.reply
}
