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
use crate::services::catalog::LineInput;
use crate::AppState;

pub fn line_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_line))
        .route("/:id", get(get_line))
        .route("/:id", put(update_line))
        .route("/:id", delete(delete_line))
}

#[utoipa::path(
    post,
    path = "/api/v1/lines",
    request_body = LineInput,
    responses(
        (status = 201, description = "Line created", body = crate::entities::ArticleLineModel),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Parent group not found", body = crate::errors::ErrorResponse)
    ),
    tag = "lines"
)]
pub async fn create_line(
    State(state): State<AppState>,
    Json(input): Json<LineInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&input)?;
    let line = state
        .services
        .catalog
        .create_line(input)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(line))
}

#[utoipa::path(
    get,
    path = "/api/v1/lines/{id}",
    params(("id" = Uuid, Path, description = "Line id")),
    responses(
        (status = 200, description = "Line found", body = crate::entities::ArticleLineModel),
        (status = 404, description = "Line not found", body = crate::errors::ErrorResponse)
    ),
    tag = "lines"
)]
pub async fn get_line(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let line = state
        .services
        .catalog
        .get_line(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(line))
}

#[utoipa::path(
    put,
    path = "/api/v1/lines/{id}",
    params(("id" = Uuid, Path, description = "Line id")),
    request_body = LineInput,
    responses(
        (status = 200, description = "Line updated", body = crate::entities::ArticleLineModel),
        (status = 404, description = "Line not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Line cannot change group", body = crate::errors::ErrorResponse)
    ),
    tag = "lines"
)]
pub async fn update_line(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<LineInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&input)?;
    let line = state
        .services
        .catalog
        .update_line(id, input)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(line))
}

#[utoipa::path(
    delete,
    path = "/api/v1/lines/{id}",
    params(("id" = Uuid, Path, description = "Line id")),
    responses(
        (status = 204, description = "Line deleted"),
        (status = 404, description = "Line not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Line still has articles", body = crate::errors::ErrorResponse)
    ),
    tag = "lines"
)]
pub async fn delete_line(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .catalog
        .delete_line(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}
