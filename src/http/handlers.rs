use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::command::validate;

use super::{
    error::AppResult,
    models::{
        ClearResponse, CompleteCommandRequest, CompleteCommandResponse, HealthResponse,
        PollResponse, StatusResponse, SubmitCommandRequest, SubmitCommandResponse,
    },
    state::AppState,
};

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn submit_command(
    State(state): State<AppState>,
    payload: Result<Json<SubmitCommandRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SubmitCommandResponse>)> {
    let Json(payload) = payload?;

    let cmd_type = validate::command_type(payload.cmd_type.as_deref())?;
    let player = validate::player(payload.player.as_deref())?;
    let timestamp = validate::timestamp(payload.timestamp)?;

    let submitted = state.broker.submit(cmd_type, &player, timestamp).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitCommandResponse {
            success: true,
            command_id: submitted.id.to_string(),
            queue_position: submitted.position,
        }),
    ))
}

pub async fn poll_command(State(state): State<AppState>) -> Json<PollResponse> {
    let command = state.broker.poll().await;

    Json(PollResponse {
        success: true,
        empty: command.is_none(),
        command,
    })
}

pub async fn complete_command(
    State(state): State<AppState>,
    payload: Result<Json<CompleteCommandRequest>, JsonRejection>,
) -> AppResult<Json<CompleteCommandResponse>> {
    let Json(payload) = payload?;

    let id = validate::command_id(payload.command_id.as_deref())?;
    let success = validate::success_flag(payload.success)?;

    let completion = state
        .broker
        .complete(&id, success, payload.error.as_deref())
        .await;

    Ok(Json(CompleteCommandResponse {
        success: true,
        removed: completion.removed(),
        message: completion.message(),
    }))
}

pub async fn queue_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.broker.status().await.into())
}

pub async fn clear_commands(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.broker.clear().await;
    Json(ClearResponse {
        success: true,
        cleared,
    })
}
