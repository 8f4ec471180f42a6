//! Client for the external completion service ("oracle").
//!
//! The oracle answers one question: given an ordered list of role-tagged
//! messages, return free text. [`OracleClient`] wraps a [`CompletionBackend`]
//! in the retry loop from [`retry`] and classifies every failure into an
//! [`OracleError`](parcel_core::OracleError).

pub mod backends;
pub mod client;
pub mod config;
pub mod retry;

pub use backends::openai::OpenAiBackend;
pub use backends::CompletionBackend;
pub use client::OracleClient;
pub use config::{OracleConfig, OracleProvider};
pub use retry::{RetryPolicy, RetryingBackend};
