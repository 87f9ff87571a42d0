//! Input checks applied before anything reaches the queue
//!
//! The queue trusts its inputs, so every field a producer or consumer
//! sends is validated and sanitized here.

use relayq_shared::{CommandId, CommandType};
use thiserror::Error;

/// Longest player identifier kept after sanitizing
pub const MAX_PLAYER_LEN: usize = 16;

/// Reasons a request is rejected before reaching the queue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    InvalidType(#[from] relayq_shared::UnknownCommandType),

    #[error("Player name contains no valid characters")]
    InvalidPlayer,

    #[error("Timestamp must be a positive number")]
    InvalidTimestamp,

    #[error("Command id must not be blank")]
    InvalidCommandId,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

/// Keep ASCII letters, digits and underscores, capped at the max length
pub fn sanitize_player(raw: &str) -> Result<String, ValidationError> {
    let player: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .take(MAX_PLAYER_LEN)
        .collect();

    if player.is_empty() {
        return Err(ValidationError::InvalidPlayer);
    }
    Ok(player)
}

pub fn command_type(raw: Option<&str>) -> Result<CommandType, ValidationError> {
    let raw = raw.ok_or(ValidationError::MissingField("type"))?;
    Ok(raw.parse()?)
}

pub fn player(raw: Option<&str>) -> Result<String, ValidationError> {
    sanitize_player(raw.ok_or(ValidationError::MissingField("player"))?)
}

pub fn timestamp(raw: Option<i64>) -> Result<i64, ValidationError> {
    match raw {
        None => Err(ValidationError::MissingField("timestamp")),
        Some(ts) if ts > 0 => Ok(ts),
        Some(_) => Err(ValidationError::InvalidTimestamp),
    }
}

pub fn command_id(raw: Option<&str>) -> Result<CommandId, ValidationError> {
    let raw = raw.ok_or(ValidationError::MissingField("commandId"))?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidCommandId);
    }
    Ok(CommandId::from(trimmed))
}

pub fn success_flag(raw: Option<bool>) -> Result<bool, ValidationError> {
    raw.ok_or(ValidationError::MissingField("success"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_disallowed_characters() {
        assert_eq!(sanitize_player("Alice").unwrap(), "Alice");
        assert_eq!(sanitize_player(" Al-ice!; DROP").unwrap(), "AliceDROP");
        assert_eq!(sanitize_player("bob_42").unwrap(), "bob_42");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "a".repeat(40);
        assert_eq!(sanitize_player(&long).unwrap().len(), MAX_PLAYER_LEN);
    }

    #[test]
    fn test_sanitize_rejects_empty_result() {
        assert_eq!(sanitize_player("  -- "), Err(ValidationError::InvalidPlayer));
        assert_eq!(sanitize_player(""), Err(ValidationError::InvalidPlayer));
    }

    #[test]
    fn test_command_type() {
        assert_eq!(command_type(Some("KICK")), Ok(CommandType::Kick));
        assert_eq!(command_type(None), Err(ValidationError::MissingField("type")));
        assert!(matches!(
            command_type(Some("mute")),
            Err(ValidationError::InvalidType(_))
        ));
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(timestamp(Some(1)), Ok(1));
        assert_eq!(timestamp(Some(0)), Err(ValidationError::InvalidTimestamp));
        assert_eq!(timestamp(Some(-5)), Err(ValidationError::InvalidTimestamp));
        assert_eq!(timestamp(None), Err(ValidationError::MissingField("timestamp")));
    }

    #[test]
    fn test_command_id() {
        assert_eq!(command_id(Some(" abc ")).unwrap().as_str(), "abc");
        assert_eq!(command_id(Some("   ")), Err(ValidationError::InvalidCommandId));
        assert_eq!(
            command_id(None),
            Err(ValidationError::MissingField("commandId"))
        );
    }
}
