use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relayq_shared::QueueError;
use serde::Serialize;
use thiserror::Error;

use crate::command::validate::ValidationError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("missing or invalid API key")]
    Unauthorized,
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("internal server error")]
    Internal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_ms: Option<u64>,
}

impl AppError {
    pub fn internal() -> Self {
        Self::Internal
    }

    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Queue(err @ QueueError::DuplicateCommand { .. }) => {
                (StatusCode::CONFLICT, err.kind())
            }
            Self::Queue(err @ QueueError::QueueFull { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, err.kind())
            }
            // Completion absorbs unknown ids; reaching here is a server fault
            Self::Queue(QueueError::CommandNotFound(_)) | Self::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationError::MalformedBody(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let retry_after_ms = match &self {
            Self::Queue(QueueError::DuplicateCommand { retry_after_ms, .. }) => {
                Some(*retry_after_ms)
            }
            _ => None,
        };

        // Internal faults never leak their details
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            success: false,
            error: kind,
            message,
            retry_after_ms,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let dup = AppError::from(QueueError::DuplicateCommand {
            player: "Alice".into(),
            retry_after_ms: 10,
        });
        assert_eq!(dup.into_response().status(), StatusCode::CONFLICT);

        let full = AppError::from(QueueError::QueueFull { max: 50 });
        assert_eq!(full.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let invalid = AppError::from(ValidationError::InvalidPlayer);
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            AppError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::internal().into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_command_not_found_is_not_exposed() {
        let err = AppError::from(QueueError::CommandNotFound("abc".into()));
        let (status, kind) = err.status_and_kind();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(kind, "INTERNAL_ERROR");
    }
}
