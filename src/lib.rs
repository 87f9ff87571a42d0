//! relayq - command relay between a monitoring script and a polling client
//!
//! The producer submits moderation commands over HTTP, the consumer polls
//! for the oldest one and acknowledges it once carried out. State lives
//! in memory only.

pub mod command;
pub mod config;
pub mod http;

pub use command::{CommandBroker, ExpirySweeper};
pub use config::ServerConfig;
pub use http::{build_router, state::AppState};
