//! Deterministic extractors: no oracle calls.

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Accepted tracking-number lengths.
pub const TRACKING_NUMBER_LENGTHS: [usize; 2] = [10, 12];

const CONFIRMATION_MIN: u64 = 1_000_000_000;
const CONFIRMATION_MAX: u64 = 9_999_999_999;

/// Returns the first maximal run of decimal digits whose length is exactly 10
/// or 12. Runs of any other length are skipped.
///
/// Any Unicode decimal digit counts, so full-width and Arabic-Indic numbers
/// are found too. Length is measured in characters.
pub fn extract_tracking_number(input: &str) -> Option<&str> {
    DIGIT_RUN
        .find_iter(input)
        .map(|m| m.as_str())
        .find(|run| TRACKING_NUMBER_LENGTHS.contains(&run.chars().count()))
}

/// A uniformly random 10-digit number in `[1000000000, 9999999999]`.
pub fn generate_confirmation_number() -> String {
    rand::thread_rng()
        .gen_range(CONFIRMATION_MIN..=CONFIRMATION_MAX)
        .to_string()
}
