//! HTTP handlers for deploy notifications and health

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State as AxumState},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use std::collections::HashMap;
use tracing::error;

use crate::SharedState;
use crate::relay::{ACKNOWLEDGMENT, relay};

/// Root health check endpoint
/// Supports ?format=json for a JSON response
pub async fn root(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let format = params.get("format").map(|s| s.as_str());

    if format == Some("json") {
        Json(json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "status": "healthy"
        }))
        .into_response()
    } else {
        concat!(env!("CARGO_PKG_NAME"), " - healthy").into_response()
    }
}

/// Handles the deploy-succeeded notification from the hosting platform.
///
/// Always acknowledges with `200 Success`. When the trigger request cannot be
/// sent and `fail_fast` is set, the handler signals the process to terminate
/// and never responds.
pub async fn deploy_succeeded(
    AxumState(state): AxumState<SharedState>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    if let Err(e) = relay(&state.trigger, &body).await {
        error!("error making trigger request: {}", e);
        if state.config.fail_fast {
            state.signal_fatal();
            std::future::pending::<()>().await;
        }
    }

    (StatusCode::OK, ACKNOWLEDGMENT)
}
