use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::services::catalog::{ArticleFilter, CreateArticleInput, PriceInput, UpdateArticleInput};
use crate::AppState;

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_article))
        .route("/", get(list_articles))
        .route("/:id", get(get_article))
        .route("/:id", put(update_article))
        .route("/:id", delete(delete_article))
        .route("/:id/prices", get(get_prices))
        .route("/:id/prices", put(update_prices))
}

/// Query parameters accepted by the article listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ArticleListParams {
    /// Substring match on the description
    pub q: Option<String>,
    pub group_id: Option<Uuid>,
    pub line_id: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

#[utoipa::path(
    post,
    path = "/api/v1/articles",
    request_body = CreateArticleInput,
    responses(
        (status = 201, description = "Article created", body = crate::services::catalog::ArticleDetail),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Article code already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "articles"
)]
pub async fn create_article(
    State(state): State<AppState>,
    Json(input): Json<CreateArticleInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&input)?;
    let article = state
        .services
        .catalog
        .create_article(input)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(article))
}

#[utoipa::path(
    get,
    path = "/api/v1/articles",
    params(ArticleListParams),
    responses(
        (status = 200, description = "Articles listed", body = crate::services::catalog::ArticleListPage)
    ),
    tag = "articles"
)]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ArticleListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ArticleFilter {
        q: params.q,
        group_id: params.group_id,
        line_id: params.line_id,
    };
    let page = state
        .services
        .catalog
        .list_articles(filter, params.page, params.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/articles/{id}",
    params(("id" = Uuid, Path, description = "Article id")),
    responses(
        (status = 200, description = "Article found", body = crate::services::catalog::ArticleDetail),
        (status = 404, description = "Article not found", body = crate::errors::ErrorResponse)
    ),
    tag = "articles"
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state
        .services
        .catalog
        .get_article(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(article))
}

#[utoipa::path(
    put,
    path = "/api/v1/articles/{id}",
    params(("id" = Uuid, Path, description = "Article id")),
    request_body = UpdateArticleInput,
    responses(
        (status = 200, description = "Article updated", body = crate::services::catalog::ArticleDetail),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Article not found", body = crate::errors::ErrorResponse)
    ),
    tag = "articles"
)]
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateArticleInput>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state
        .services
        .catalog
        .update_article(id, input)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(article))
}

#[utoipa::path(
    delete,
    path = "/api/v1/articles/{id}",
    params(("id" = Uuid, Path, description = "Article id")),
    responses(
        (status = 204, description = "Article deleted"),
        (status = 404, description = "Article not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Article referenced by order lines", body = crate::errors::ErrorResponse)
    ),
    tag = "articles"
)]
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .catalog
        .delete_article(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/articles/{id}/prices",
    params(("id" = Uuid, Path, description = "Article id")),
    responses(
        (status = 200, description = "Price tiers", body = crate::services::catalog::PriceView),
        (status = 404, description = "Article not found", body = crate::errors::ErrorResponse)
    ),
    tag = "articles"
)]
pub async fn get_prices(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let prices = state
        .services
        .catalog
        .get_prices(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(prices))
}

#[utoipa::path(
    put,
    path = "/api/v1/articles/{id}/prices",
    params(("id" = Uuid, Path, description = "Article id")),
    request_body = PriceInput,
    responses(
        (status = 200, description = "Prices updated", body = crate::services::catalog::PriceView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Article not found", body = crate::errors::ErrorResponse)
    ),
    tag = "articles"
)]
pub async fn update_prices(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PriceInput>,
) -> Result<impl IntoResponse, ApiError> {
    let prices = state
        .services
        .catalog
        .update_prices(id, input)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(prices))
}
