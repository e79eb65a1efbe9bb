use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Extension, Json, Router,
};
use serde_json::Value;
use taxdesk_core::profiles::{ProfileContactUpdate, TaxProfile};

use crate::{
    api::ApiJson, auth::AuthenticatedUser, error::ApiResult, main_lib::AppState,
};

#[utoipa::path(get, path = "/api/v1/profile", responses((status = 200, description = "Tax profile")))]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<TaxProfile>> {
    let profile = state.profile_service.get_profile(&user.user_id)?;
    Ok(Json(profile))
}

#[utoipa::path(put, path = "/api/v1/profile", responses((status = 200, description = "Updated tax profile")))]
pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(update): ApiJson<ProfileContactUpdate>,
) -> ApiResult<Json<TaxProfile>> {
    let profile = state
        .profile_service
        .update_contact(&user.user_id, update)
        .await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/v1/profile/sections/{section}",
    params(("section" = String, Path, description = "Section name, e.g. personal or income")),
    responses((status = 200, description = "Updated tax profile"))
)]
pub async fn save_section(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(section): Path<String>,
    ApiJson(document): ApiJson<Value>,
) -> ApiResult<Json<TaxProfile>> {
    let profile = state
        .profile_service
        .save_section(&user.user_id, &section, document)
        .await?;
    Ok(Json(profile))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile).put(update_contact))
        .route("/profile/sections/{section}", put(save_section))
}
