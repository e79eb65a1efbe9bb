use std::sync::Arc;

use axum::{extract::State, routing::post, Extension, Json, Router};
use taxdesk_core::{
    constants::NOTIFICATION_BATCH_PATH,
    notifications::{BatchNotificationRequest, BatchOutcome},
};

use crate::{
    api::ApiJson,
    auth::AuthenticatedUser,
    error::{ApiResult, ErrorBody},
    main_lib::AppState,
    models::BatchNotificationBody,
};

#[utoipa::path(
    post,
    path = "/api/v1/notifications/batch",
    request_body = BatchNotificationBody,
    responses(
        (status = 200, description = "`{\"status\":\"sent\"}` or `{\"status\":\"alreadyProcessed\"}`"),
        (status = 400, body = ErrorBody),
        (status = 502, body = ErrorBody, description = "Email dispatch failed; the batch may be retried")
    )
)]
pub async fn notify_batch(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<BatchNotificationRequest>,
) -> ApiResult<Json<BatchOutcome>> {
    let outcome = state
        .notification_service
        .notify_batch(&user.user_id, &request)
        .await?;
    tracing::debug!(
        "Batch {:?} for user {}: {:?}",
        request.batch_id,
        user.user_id,
        outcome
    );
    Ok(Json(outcome))
}

pub fn router() -> Router<Arc<AppState>> {
    let path = NOTIFICATION_BATCH_PATH
        .strip_prefix("/api/v1")
        .unwrap_or(NOTIFICATION_BATCH_PATH);
    Router::new().route(path, post(notify_batch))
}
