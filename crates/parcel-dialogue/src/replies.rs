//! Templated assistant replies.

pub const GREETING: &str =
    "Hello! I'm here to help you track your package. Could you please provide your tracking number or order ID?";

pub const ASK_ALTERNATIVE_INFO: &str =
    "I understand you don't have a tracking number. Could you please provide your email or name?";

pub const INVALID_TRACKING_NUMBER: &str = "Your tracking number must be 10 or 12 digits";

pub const INVALID_INPUT: &str = "That doesn't look right, please provide the information requested.";

pub const TRACKING_UNRECOGNIZED: &str = "I'm sorry, I couldn't determine your input. \
Please rephrase your tracking number or indicate if you don't have it.";

pub const ALTERNATIVE_INFO_UNRECOGNIZED: &str =
    "I'm sorry, I couldn't understand that. Please provide the information requested.";

pub const ASK_TICKET_DETAILS: &str =
    "I can help file a support ticket. Please provide more details about the issue.";

pub const UPDATES_SCHEDULED: &str = "Great! I'll send you real-time updates to the email associated with the order. \
Are you still in need of assistance?";

pub const CONFIRMED_UNRECOGNIZED: &str =
    "I'm sorry, I didn't understand. Please provide either updates or ticket help.";

pub const CONTINUE: &str =
    "Okay, let's continue. Would you like real-time updates or assistance filing a support ticket?";

pub const GOODBYE: &str = "Thank you for using our service. Goodbye!";

pub const CONVERSATION_ENDED: &str =
    "The conversation has ended. Please restart if you need further assistance.";

pub fn tracking_confirmed(number: &str) -> String {
    format!(
        "Great, tracking number {number} confirmed. Your package encountered some shipping delays \
         but is now currently in transit. Would you like real-time updates or assistance filing a support ticket?"
    )
}

/// Echoes `details` verbatim.
pub fn ticket_filed(details: &str) -> String {
    format!(
        "Thanks for the details. I've filed a support ticket regarding: '{details}'. \
         Our team will follow up shortly at the email associated with your order. \
         Are you still in need of assistance?"
    )
}
