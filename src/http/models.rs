use relayq_shared::{Command, QueueStatus};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/commands`
///
/// Every field is optional at the serde level so missing fields produce
/// a field-specific validation error instead of a generic rejection.
#[derive(Debug, Deserialize)]
pub struct SubmitCommandRequest {
    #[serde(rename = "type")]
    pub cmd_type: Option<String>,
    pub player: Option<String>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCommandResponse {
    pub success: bool,
    pub command_id: String,
    pub queue_position: usize,
}

#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub success: bool,
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
}

/// Body of `POST /api/commands/complete`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCommandRequest {
    pub command_id: Option<String>,
    pub success: Option<bool>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompleteCommandResponse {
    pub success: bool,
    pub removed: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub queue_size: usize,
    pub max_queue_size: usize,
    pub cooldown_count: usize,
    pub oldest_command_age_ms: u64,
}

impl From<QueueStatus> for StatusResponse {
    fn from(status: QueueStatus) -> Self {
        Self {
            success: true,
            queue_size: status.pending,
            max_queue_size: status.max_pending,
            cooldown_count: status.cooldowns,
            oldest_command_age_ms: status.oldest_age_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub cleared: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
