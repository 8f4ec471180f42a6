//! Decision prompts sent to the oracle.

use crate::state::DialogueState;
use std::fmt::Write;

/// `(label, condition)` pairs, rendered as "'label' if condition."
pub type Options = [(&'static str, &'static str)];

pub const TRACKING_OPTIONS: &Options = &[
    ("invalid_tracking", "the input contains a number"),
    ("alternative_info", "the user indicates they don't have a tracking number"),
    ("restart", "the user wants to restart the conversation"),
    ("invalid", "the input is irrelevant or does not match the expected format"),
];

pub const ALTERNATIVE_INFO_OPTIONS: &Options = &[
    ("valid_alternative", "the input is valid identifying information"),
    ("invalid", "the input is not acceptable"),
    ("restart", "the user wants to restart the conversation"),
];

pub const CONFIRMED_OPTIONS: &Options = &[
    ("filing_ticket", "the user wants to file a support ticket"),
    ("finalizing", "the user wants to receive real-time updates and finalize the conversation"),
    ("restart", "the user wants to restart"),
    ("invalid", "the input is irrelevant"),
];

pub const FINALIZING_OPTIONS: &Options = &[
    ("continue", "the user still needs assistance"),
    ("end", "the conversation should end"),
    ("restart", "the user wants to restart"),
];

/// Renders a decision prompt: state name, quoted user input, numbered
/// options, and an instruction to answer with exactly one label.
pub fn render(state: DialogueState, user_input: &str, question: &str, options: &Options) -> String {
    let mut prompt = format!(
        "You are a decision-making assistant for a package tracking chatbot. \
         The current state is '{state}'. The user provided: \"{user_input}\".\n\n\
         {question} Options are:\n"
    );
    for (i, (label, condition)) in options.iter().enumerate() {
        let _ = writeln!(prompt, "{}. '{label}' if {condition}.", i + 1);
    }

    let labels: Vec<&str> = options.iter().map(|(label, _)| *label).collect();
    let listed = match labels.split_last() {
        Some((last, [])) => (*last).to_string(),
        Some((last, rest)) => format!("{}, or {last}", rest.join(", ")),
        None => String::new(),
    };
    let _ = write!(prompt, "\nRespond with only one of these words: {listed}.");
    prompt
}

pub fn awaiting_tracking(user_input: &str) -> String {
    render(
        DialogueState::AwaitingTracking,
        user_input,
        "Decide which branch to follow.",
        TRACKING_OPTIONS,
    )
}

pub fn awaiting_alternative_info(user_input: &str) -> String {
    render(
        DialogueState::AwaitingAlternativeInfo,
        user_input,
        "Decide if this alternative information (email or name) is valid.",
        ALTERNATIVE_INFO_OPTIONS,
    )
}

pub fn tracking_confirmed(user_input: &str) -> String {
    render(
        DialogueState::TrackingConfirmed,
        user_input,
        "Decide which branch to follow.",
        CONFIRMED_OPTIONS,
    )
}

pub fn finalizing(user_input: &str) -> String {
    render(
        DialogueState::Finalizing,
        user_input,
        "Decide if the conversation should continue or end.",
        FINALIZING_OPTIONS,
    )
}
