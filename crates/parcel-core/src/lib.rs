//! Core types and error definitions for the parcel tracking assistant.
//!
//! This crate provides the foundational types shared across all parcel crates.
//!
//! # Main types
//!
//! - [`ParcelError`] — Unified error enum for all subsystems.
//! - [`ParcelResult`] — Convenience alias for `Result<T, ParcelError>`.
//! - [`OracleError`] — Classified failure of the completion service.
//! - [`Role`] — Message role (system, user, assistant).
//! - [`Message`] — A single role-tagged entry of a conversation transcript.

mod error;
mod message;

pub use error::{OracleError, ParcelError, ParcelResult};
pub use message::{Message, Role};
