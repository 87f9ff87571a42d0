//! Shared-secret gate in front of the API routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::warn;

use super::{error::AppError, state::AppState};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests whose `x-api-key` header does not match the configured secret
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !keys_match(provided.as_bytes(), state.api_key.as_bytes()) {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected request with missing or invalid API key"
        );
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Constant-time key comparison
///
/// Both sides are padded to the same length so the comparison time does
/// not depend on where the first mismatch is.
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    if provided.is_empty() {
        return false;
    }

    let max_len = provided.len().max(expected.len());
    let mut provided_padded = provided.to_vec();
    let mut expected_padded = expected.to_vec();
    provided_padded.resize(max_len, 0);
    expected_padded.resize(max_len, 0);

    let same_bytes: bool = provided_padded.ct_eq(&expected_padded).into();
    same_bytes && provided.len() == expected.len()
}
