//! HTTP adapter over the command broker
//!
//! Translates requests into broker calls and queue results into status
//! codes. All `/api` routes sit behind the shared-secret gate.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

use std::any::Any;

use axum::{
    http::Method,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use self::{
    auth::{require_api_key, API_KEY_HEADER},
    error::AppError,
    handlers::{
        clear_commands, complete_command, healthcheck, poll_command, queue_status, submit_command,
    },
    state::AppState,
};

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/commands", post(submit_command).delete(clear_commands))
        .route("/commands/poll", get(poll_command))
        .route("/commands/complete", post(complete_command))
        .route("/status", get(queue_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(healthcheck))
        .nest("/api", api)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::HeaderName::from_static(API_KEY_HEADER),
                ])
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    error!("Request handler panicked");
    AppError::internal().into_response()
}
