use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::services::catalog::GroupInput;
use crate::AppState;

pub fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_group))
        .route("/", get(list_groups))
        .route("/:id", get(get_group))
        .route("/:id", put(update_group))
        .route("/:id", delete(delete_group))
        .route("/:id/lines", get(list_group_lines))
}

#[utoipa::path(
    post,
    path = "/api/v1/groups",
    request_body = GroupInput,
    responses(
        (status = 201, description = "Group created", body = crate::entities::ArticleGroupModel),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "groups"
)]
pub async fn create_group(
    State(state): State<AppState>,
    Json(input): Json<GroupInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&input)?;
    let group = state
        .services
        .catalog
        .create_group(input)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(group))
}

#[utoipa::path(
    get,
    path = "/api/v1/groups",
    responses(
        (status = 200, description = "Groups listed", body = [crate::entities::ArticleGroupModel])
    ),
    tag = "groups"
)]
pub async fn list_groups(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let groups = state
        .services
        .catalog
        .list_groups()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(groups))
}

#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group found", body = crate::entities::ArticleGroupModel),
        (status = 404, description = "Group not found", body = crate::errors::ErrorResponse)
    ),
    tag = "groups"
)]
pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let group = state
        .services
        .catalog
        .get_group(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(group))
}

#[utoipa::path(
    put,
    path = "/api/v1/groups/{id}",
    params(("id" = Uuid, Path, description = "Group id")),
    request_body = GroupInput,
    responses(
        (status = 200, description = "Group updated", body = crate::entities::ArticleGroupModel),
        (status = 404, description = "Group not found", body = crate::errors::ErrorResponse)
    ),
    tag = "groups"
)]
pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<GroupInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&input)?;
    let group = state
        .services
        .catalog
        .update_group(id, input)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(group))
}

#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 404, description = "Group not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Group still has articles", body = crate::errors::ErrorResponse)
    ),
    tag = "groups"
)]
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .catalog
        .delete_group(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}/lines",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 200, description = "Active lines of the group", body = [crate::entities::ArticleLineModel]),
        (status = 404, description = "Group not found", body = crate::errors::ErrorResponse)
    ),
    tag = "groups"
)]
pub async fn list_group_lines(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lines = state
        .services
        .catalog
        .list_lines_by_group(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(lines))
}
