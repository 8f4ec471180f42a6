use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a conversation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    /// Initial state. Any input produces the greeting.
    #[default]
    Greeting,
    /// Waiting for a tracking number or order ID.
    AwaitingTracking,
    /// The user has no tracking number; waiting for an email or name.
    AwaitingAlternativeInfo,
    /// A tracking number is known; offering updates or a support ticket.
    TrackingConfirmed,
    /// Waiting for the details of a support ticket.
    FilingTicket,
    /// Asking whether the user still needs help.
    Finalizing,
    /// Absorbing terminal state.
    End,
}

impl DialogueState {
    /// Every state, in conversation order.
    pub const ALL: [DialogueState; 7] = [
        DialogueState::Greeting,
        DialogueState::AwaitingTracking,
        DialogueState::AwaitingAlternativeInfo,
        DialogueState::TrackingConfirmed,
        DialogueState::FilingTicket,
        DialogueState::Finalizing,
        DialogueState::End,
    ];

    /// The snake_case name, as used in decision prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueState::Greeting => "greeting",
            DialogueState::AwaitingTracking => "awaiting_tracking",
            DialogueState::AwaitingAlternativeInfo => "awaiting_alternative_info",
            DialogueState::TrackingConfirmed => "tracking_confirmed",
            DialogueState::FilingTicket => "filing_ticket",
            DialogueState::Finalizing => "finalizing",
            DialogueState::End => "end",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DialogueState::End)
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
