//! HTTP gateway for the parcel tracking assistant.
//!
//! Exposes `/api/chatbot-data`, `/api/send-message` and `/api/health` over a
//! shared [`SessionRegistry`](parcel_dialogue::SessionRegistry). Requests that
//! name no session use the default one.

pub mod config;
pub mod error;
pub mod server;

pub use config::{BotProfile, GatewayConfig};
pub use error::{ApiError, ApiResult};
pub use server::{AppState, GatewayServer};
