use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use taxdesk_core::household::{
    HouseholdMember, HouseholdMemberUpdate, HouseholdWithMembers, NewHouseholdMember,
};

use crate::{
    api::ApiJson, auth::AuthenticatedUser, error::ApiResult, main_lib::AppState,
};

#[utoipa::path(get, path = "/api/v1/household", responses((status = 200, description = "Household and members")))]
pub async fn get_household(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<HouseholdWithMembers>> {
    let household = state.household_service.get_household(&user.user_id).await?;
    Ok(Json(household))
}

#[utoipa::path(post, path = "/api/v1/household/members", responses((status = 200, description = "Created member")))]
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(member): ApiJson<NewHouseholdMember>,
) -> ApiResult<Json<HouseholdMember>> {
    let created = state
        .household_service
        .add_member(&user.user_id, member)
        .await?;
    Ok(Json(created))
}

#[utoipa::path(
    put,
    path = "/api/v1/household/members/{id}",
    params(("id" = String, Path, description = "Member id")),
    responses((status = 200, description = "Updated member"), (status = 404, description = "No such member in the caller's household"))
)]
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<HouseholdMemberUpdate>,
) -> ApiResult<Json<HouseholdMember>> {
    let updated = state
        .household_service
        .update_member(&user.user_id, &id, update)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/household/members/{id}",
    params(("id" = String, Path, description = "Member id")),
    responses((status = 204), (status = 404, description = "No such member in the caller's household"))
)]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .household_service
        .remove_member(&user.user_id, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/household", get(get_household))
        .route("/household/members", post(add_member))
        .route(
            "/household/members/{id}",
            put(update_member).delete(remove_member),
        )
}
