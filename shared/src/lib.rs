//! relayq shared types
//!
//! This crate provides the command types, clock abstraction and the
//! in-memory queue engine used by the relayq server.

pub mod clock;
pub mod queue;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub use clock::{Clock, ManualClock, SystemClock};
pub use queue::{
    CommandQueue, Completion, QueueConfig, QueueError, QueueStatus, Submitted, SweepReport,
};

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Default queue limits
pub mod limits {
    /// Maximum number of pending commands
    pub const MAX_PENDING_COMMANDS: usize = 50;

    /// How long a command may stay pending before it is discarded
    pub const COMMAND_EXPIRATION_MS: u64 = 300_000;

    /// Minimum time between two accepted commands for the same player
    pub const PLAYER_COOLDOWN_MS: u64 = 60_000;
}

/// Kind of moderation command a consumer should carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Kick,
    Ban,
}

impl CommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Kick => "kick",
            CommandType::Ban => "ban",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a command type string is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command type '{0}', expected one of: kick, ban")]
pub struct UnknownCommandType(pub String);

impl FromStr for CommandType {
    type Err = UnknownCommandType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kick" => Ok(CommandType::Kick),
            "ban" => Ok(CommandType::Ban),
            _ => Err(UnknownCommandType(s.to_string())),
        }
    }
}

/// Opaque command identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(String);

impl CommandId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CommandId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A pending command as stored by the queue and handed to the consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: CommandId,
    #[serde(rename = "type")]
    pub cmd_type: CommandType,
    pub player: String,
    /// Caller-supplied timestamp, passed through untouched
    #[serde(rename = "timestamp")]
    pub client_timestamp: i64,
    pub attempts: u32,
    #[serde(rename = "createdAt")]
    pub created_at_ms: u64,
    #[serde(rename = "expiresAt")]
    pub expires_at_ms: u64,
}

impl Command {
    /// Create a new command arriving at `now_ms`
    pub fn new(
        id: CommandId,
        cmd_type: CommandType,
        player: impl Into<String>,
        client_timestamp: i64,
        now_ms: u64,
        expiration_ms: u64,
    ) -> Self {
        Self {
            id,
            cmd_type,
            player: player.into(),
            client_timestamp,
            attempts: 0,
            created_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(expiration_ms),
        }
    }

    /// Check if this command has expired at `now_ms`
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// Time the command has spent in the queue
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }
}
