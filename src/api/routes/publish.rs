//! Publish Route
//!
//! - POST /api/v1/publish - Publish a message from the server side

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{PublishRequest, PublishResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// Origin reported for messages published over HTTP
pub const HTTP_ORIGIN: &str = "http";

/// POST /api/v1/publish
///
/// Delivers the payload to every websocket subscriber of the topic,
/// subject to the same auth checks as a websocket publish.
pub async fn publish(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishRequest>,
) -> ApiResult<Json<PublishResponse>> {
    let recipients = state
        .ws_hub
        .publish(HTTP_ORIGIN, &request.topic, request.data)
        .await?;

    tracing::debug!(topic = %request.topic, recipients, "HTTP publish");

    Ok(Json(PublishResponse {
        topic: request.topic,
        recipients,
    }))
}
