//! Branch labels the oracle may answer with, one enum per decision state.
//!
//! Labels arrive already normalized (trimmed, lowercased). Anything outside a
//! state's label set parses to `Unrecognized`, so every state's match over its
//! branches is total.

/// Decision space of [`DialogueState::AwaitingTracking`](crate::DialogueState::AwaitingTracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingBranch {
    InvalidTracking,
    AlternativeInfo,
    Restart,
    Invalid,
    Unrecognized,
}

impl TrackingBranch {
    pub fn from_label(label: &str) -> Self {
        match label {
            "invalid_tracking" => Self::InvalidTracking,
            "alternative_info" => Self::AlternativeInfo,
            "restart" => Self::Restart,
            "invalid" => Self::Invalid,
            _ => Self::Unrecognized,
        }
    }
}

/// Decision space of [`DialogueState::AwaitingAlternativeInfo`](crate::DialogueState::AwaitingAlternativeInfo).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternativeInfoBranch {
    ValidAlternative,
    Invalid,
    Restart,
    Unrecognized,
}

impl AlternativeInfoBranch {
    pub fn from_label(label: &str) -> Self {
        match label {
            "valid_alternative" => Self::ValidAlternative,
            "invalid" => Self::Invalid,
            "restart" => Self::Restart,
            _ => Self::Unrecognized,
        }
    }
}

/// Decision space of [`DialogueState::TrackingConfirmed`](crate::DialogueState::TrackingConfirmed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmedBranch {
    FilingTicket,
    Finalizing,
    Restart,
    Invalid,
    Unrecognized,
}

impl ConfirmedBranch {
    pub fn from_label(label: &str) -> Self {
        match label {
            "filing_ticket" => Self::FilingTicket,
            "finalizing" => Self::Finalizing,
            "restart" => Self::Restart,
            "invalid" => Self::Invalid,
            _ => Self::Unrecognized,
        }
    }
}

/// Decision space of [`DialogueState::Finalizing`](crate::DialogueState::Finalizing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizingBranch {
    Continue,
    End,
    Restart,
    Unrecognized,
}

impl FinalizingBranch {
    pub fn from_label(label: &str) -> Self {
        match label {
            "continue" => Self::Continue,
            "end" => Self::End,
            "restart" => Self::Restart,
            _ => Self::Unrecognized,
        }
    }
}
